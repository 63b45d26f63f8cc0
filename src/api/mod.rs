//! CDNZZ management API
//!
//! [`CdnzzApi`] has one required method, [`CdnzzApi::invoke`], and a provided
//! method per remote operation. Each named operation only fixes the wire
//! method name and the field names, then forwards to `invoke`.

pub mod client;
pub mod mock;

pub use client::CdnzzClient;
pub use mock::{MockCdnzzClient, RecordedCall};

use crate::models::{format_day, RecordType, VerifyType};
use crate::params::Params;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

#[async_trait]
pub trait CdnzzApi: Send + Sync {
    /// Call a remote operation by name and return its `result` payload.
    async fn invoke(&self, method: &str, params: Params) -> Result<Value>;

    async fn add_domain(&self, domain: &str) -> Result<Value> {
        self.invoke("AddDomain", Params::new().with("domain", domain))
            .await
    }

    async fn list_domains(&self) -> Result<Value> {
        self.invoke("ListDomain", Params::new()).await
    }

    async fn fetch_verify_info(&self, domain: &str) -> Result<Value> {
        self.invoke("FetchVerifyInfo", Params::new().with("domain", domain))
            .await
    }

    async fn verify_domain(&self, domain: &str, verify_type: Option<VerifyType>) -> Result<Value> {
        let params = Params::new()
            .with("domain", domain)
            .with_opt("verify_type", verify_type.map(|t| t.as_str()));
        self.invoke("VerifyDomain", params).await
    }

    async fn add_sub_domain(
        &self,
        domain: &str,
        host: &str,
        record_type: RecordType,
        value: &str,
    ) -> Result<Value> {
        let params = Params::new()
            .with("domain", domain)
            .with("host", host)
            .with("type", record_type.as_str())
            .with("value", value);
        self.invoke("AddSubDomain", params).await
    }

    async fn delete_sub_domain(&self, domain: &str, sub_id: &str) -> Result<Value> {
        let params = Params::new().with("domain", domain).with("sub_id", sub_id);
        self.invoke("DelSubDomain", params).await
    }

    async fn list_sub_domains(&self, domain: &str) -> Result<Value> {
        self.invoke("ListSubDomain", Params::new().with("domain", domain))
            .await
    }

    async fn modify_sub_domain(
        &self,
        domain: &str,
        sub_id: &str,
        host: &str,
        record_type: RecordType,
        value: &str,
    ) -> Result<Value> {
        let params = Params::new()
            .with("domain", domain)
            .with("sub_id", sub_id)
            .with("host", host)
            .with("type", record_type.as_str())
            .with("value", value);
        self.invoke("ModifySubDomain", params).await
    }

    async fn activate_sub_domain(&self, domain: &str, sub_id: &str) -> Result<Value> {
        let params = Params::new().with("domain", domain).with("sub_id", sub_id);
        self.invoke("ActiveSubDomain", params).await
    }

    async fn deactivate_sub_domain(&self, domain: &str, sub_id: &str) -> Result<Value> {
        let params = Params::new().with("domain", domain).with("sub_id", sub_id);
        self.invoke("InactiveSubDomain", params).await
    }

    async fn add_preload(&self, url: &str) -> Result<Value> {
        self.invoke("AddPreload", Params::new().with("url", url)).await
    }

    async fn purge_cache(&self, url: &str) -> Result<Value> {
        self.invoke("PurgeCache", Params::new().with("url", url)).await
    }

    async fn fetch_bandwidth(
        &self,
        domain: &str,
        sub_name: &str,
        start_day: Option<NaiveDate>,
        end_day: Option<NaiveDate>,
    ) -> Result<Value> {
        self.invoke(
            "FetchBandwidth",
            stats_params(domain, sub_name, start_day, end_day),
        )
        .await
    }

    async fn fetch_traffic(
        &self,
        domain: &str,
        sub_name: &str,
        start_day: Option<NaiveDate>,
        end_day: Option<NaiveDate>,
    ) -> Result<Value> {
        self.invoke(
            "FetchTraffic",
            stats_params(domain, sub_name, start_day, end_day),
        )
        .await
    }
}

fn stats_params(
    domain: &str,
    sub_name: &str,
    start_day: Option<NaiveDate>,
    end_day: Option<NaiveDate>,
) -> Params {
    Params::new()
        .with("domain", domain)
        .with("sub_name", sub_name)
        .with_opt("start_day", start_day.map(format_day))
        .with_opt("end_day", end_day.map(format_day))
}
