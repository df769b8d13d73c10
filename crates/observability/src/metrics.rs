//! Channel 指标收集模块
//!
//! 基于 `metrics` crate；未安装 recorder 时所有调用均为空操作。

use metrics::counter;

/// 单次分发的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 已调用 receiver 方法
    Delivered,
    /// 合约名或方法 id 不匹配
    Unmatched,
    /// receiver 已释放
    Expired,
    /// payload 解码失败
    Fault,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Unmatched => "unmatched",
            Self::Expired => "expired",
            Self::Fault => "fault",
        }
    }
}

/// 记录 emitter 发出的 payload
pub fn record_payload_emitted(contract: &str) {
    counter!(
        "channel_payloads_emitted_total",
        "contract" => contract.to_string()
    )
    .increment(1);
}

/// 记录 dispatcher 分发结果
pub fn record_dispatch(contract: &str, outcome: DispatchOutcome) {
    counter!(
        "channel_dispatch_total",
        "contract" => contract.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// 记录 pipe 丢弃的 payload（队列满、已关闭或发送失败）
pub fn record_pipe_dropped(pipe: &str) {
    counter!("channel_pipe_dropped_total", "pipe" => pipe.to_string()).increment(1);
}
