// Copyright 2025 Cowboy AI, LLC.

//! Keeps links and moves within one persistence space

use super::services::{EntanglementOperation, EntanglementRequest};
use crate::core::services::IdentifierService;
use crate::policy::Policy;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// Denies linking or moving an object into a parent in another space
///
/// Candidate: [`EntanglementRequest`]. Copies are always allowed, since
/// the copy is created in the parent's space.
pub struct CrossSpacePolicy {
    identifiers: Arc<IdentifierService>,
}

impl CrossSpacePolicy {
    /// Policy resolving spaces through `identifiers`
    pub fn new(identifiers: Arc<IdentifierService>) -> Self {
        Self { identifiers }
    }
}

impl Policy for CrossSpacePolicy {
    fn allow(&self, candidate: &dyn Any, _context: &dyn Any) -> bool {
        let Some(request) = candidate.downcast_ref::<EntanglementRequest>() else {
            return true;
        };
        if request.operation == EntanglementOperation::Copy {
            return true;
        }
        let from = self.identifiers.space_of(request.object.identifier());
        let to = self.identifiers.space_of(request.parent.identifier());
        if from != to {
            debug!(operation = %request.operation, from = %from, to = %to, "Cross-space request denied");
        }
        from == to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{model_handle, CoreCapabilityService, DomainObject};
    use crate::identifiers::Identifier;
    use serde_json::json;
    use test_case::test_case;

    fn object(id: &str) -> DomainObject {
        DomainObject::new(
            Identifier::parse(id),
            model_handle(json!({})),
            Arc::new(CoreCapabilityService::from_factories(Vec::new())),
        )
    }

    #[test_case(EntanglementOperation::Link, "mct:a", "mct:p", true; "link within space")]
    #[test_case(EntanglementOperation::Move, "a", "mct:p", true; "unqualified ids use default space")]
    #[test_case(EntanglementOperation::Link, "lab:a", "mct:p", false; "link across spaces")]
    #[test_case(EntanglementOperation::Move, "lab:a", "mct:p", false; "move across spaces")]
    #[test_case(EntanglementOperation::Copy, "lab:a", "mct:p", true; "copy across spaces")]
    fn test_cross_space(operation: EntanglementOperation, object_id: &str, parent_id: &str, allowed: bool) {
        let policy = CrossSpacePolicy::new(Arc::new(IdentifierService::new("mct")));
        let parent = object(parent_id);
        let request = EntanglementRequest {
            operation,
            object: object(object_id),
            parent: parent.clone(),
        };
        assert_eq!(policy.allow(&request, &parent), allowed);
    }
}
