use crate::engine::xr::{SessionMode, XrPlatform};

/// Result of the one-shot capability probe run at mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Supported,
    Unsupported,
    /// The platform has no capability query at all.
    QueryUnavailable,
    QueryFailed(String),
}

impl ProbeOutcome {
    pub fn is_supported(&self) -> bool {
        matches!(self, ProbeOutcome::Supported)
    }
}

/// Ask the platform whether `mode` sessions can be created.
///
/// Every failure collapses into a non-supported outcome; the caller decides
/// how loudly to report it.
pub async fn probe_capability<P: XrPlatform>(platform: &mut P, mode: SessionMode) -> ProbeOutcome {
    if !platform.has_capability_query() {
        return ProbeOutcome::QueryUnavailable;
    }

    match platform.is_session_supported(mode).await {
        Ok(true) => ProbeOutcome::Supported,
        Ok(false) => ProbeOutcome::Unsupported,
        Err(err) => ProbeOutcome::QueryFailed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::xr::SimulatedPlatform;

    fn probe(mut platform: SimulatedPlatform) -> ProbeOutcome {
        pollster::block_on(probe_capability(&mut platform, SessionMode::ImmersiveAr))
    }

    #[test]
    fn supported_platform() {
        assert_eq!(probe(SimulatedPlatform::new()), ProbeOutcome::Supported);
    }

    #[test]
    fn missing_query_short_circuits() {
        let outcome = probe(SimulatedPlatform::new().without_capability_query());
        assert_eq!(outcome, ProbeOutcome::QueryUnavailable);
        assert!(!outcome.is_supported());
    }

    #[test]
    fn rejected_query_is_not_supported() {
        let outcome = probe(SimulatedPlatform::new().with_query_error("security error"));
        assert!(matches!(outcome, ProbeOutcome::QueryFailed(ref msg) if msg.contains("security error")));
        assert!(!outcome.is_supported());
    }

    #[test]
    fn ar_unavailable() {
        let outcome = probe(SimulatedPlatform::new().with_ar_supported(false));
        assert_eq!(outcome, ProbeOutcome::Unsupported);
    }
}
