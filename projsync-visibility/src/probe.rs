//! Blocking HTTP status probe.

use std::time::Duration;

use crate::{StatusProbe, VisibilityError};

/// [`StatusProbe`] issuing a single unauthenticated `GET` through ureq.
///
/// 4xx/5xx responses are statuses, not errors; only transport failures
/// (DNS, TLS, timeout, connection reset) surface as [`VisibilityError::Transport`].
#[derive(Debug, Clone)]
pub struct HttpProbe {
    agent: ureq::Agent,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("projsync/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl StatusProbe for HttpProbe {
    fn status(&self, url: &str) -> Result<u16, VisibilityError> {
        tracing::debug!("probing {url}");
        match self.agent.get(url).call() {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(code, _)) => Ok(code),
            Err(ureq::Error::Transport(t)) => Err(VisibilityError::Transport {
                url: url.to_string(),
                message: t.to_string(),
            }),
        }
    }
}
