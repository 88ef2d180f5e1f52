use std::sync::Arc;

use custos_application::{PolicySource, RoleStore, StorePolicySource};
use custos_infrastructure::InMemoryPolicyMatrix;

use crate::api_config::{ApiConfig, PolicySourceConfig};

pub(super) struct PolicySet {
    pub source: Arc<dyn PolicySource>,
    pub matrix: Option<Arc<InMemoryPolicyMatrix>>,
}

pub(super) fn build_policy_source(config: &ApiConfig, role_store: Arc<dyn RoleStore>) -> PolicySet {
    match config.policy_source {
        PolicySourceConfig::Store => PolicySet {
            source: Arc::new(StorePolicySource::new(role_store)),
            matrix: None,
        },
        PolicySourceConfig::Matrix => {
            let matrix = Arc::new(InMemoryPolicyMatrix::with_default_policy());
            PolicySet {
                source: matrix.clone(),
                matrix: Some(matrix),
            }
        }
    }
}
