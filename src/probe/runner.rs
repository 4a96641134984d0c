//! # 探测执行
//!
//! 按顺序逐项执行，每项独立容错：失败只影响自己的标记，不会中断后续探测。

use super::{CapabilityFlags, ProbeDescriptor, ProbeRequest};
use crate::logging::{LogComponent, LogStage};
use crate::store_api::StoreClient;
use crate::{ldebug, linfo, lwarn};

/// 探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// 各能力标记
    pub accesses: CapabilityFlags,
    /// 失败信息，按探测顺序
    pub errors: Vec<String>,
}

/// 依次执行探测
pub async fn run_probes(
    client: &dyn StoreClient,
    probes: &[ProbeDescriptor],
    correlation_id: &str,
) -> ProbeOutcome {
    let mut accesses = CapabilityFlags::optimistic();
    let mut errors = Vec::new();

    for probe in probes {
        let result = match &probe.request {
            ProbeRequest::Get { path } => client.get(path).await,
            ProbeRequest::Post { path, body } => client.post(path, body).await,
        };

        match result {
            Ok(response) => {
                ldebug!(
                    correlation_id,
                    LogStage::Probe,
                    LogComponent::Prober,
                    probe.name,
                    &format!("{} succeeded: {response}", probe.name)
                );
            }
            Err(e) => {
                lwarn!(
                    correlation_id,
                    LogStage::Probe,
                    LogComponent::Prober,
                    probe.name,
                    &format!("{} failed: {e}", probe.name)
                );
                accesses.set(probe.capability, false);
                errors.push(e.to_string());
            }
        }
    }

    linfo!(
        correlation_id,
        LogStage::Probe,
        LogComponent::Prober,
        "probes_complete",
        &format!(
            "{} of {} probes succeeded",
            probes.len() - errors.len(),
            probes.len()
        )
    );

    ProbeOutcome { accesses, errors }
}
