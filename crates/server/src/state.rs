use std::sync::Arc;

use service::briefs::BriefService;

/// Shared handler state: the orchestrating brief service.
#[derive(Clone)]
pub struct ServerState {
    pub briefs: Arc<BriefService>,
}
