//! Tool contract and registry.

use async_trait::async_trait;
use std::sync::Arc;
use twinbot_provider::{query_schema, ToolSignature};

/// A capability the model may request during a turn.
///
/// `call` is infallible by contract: a tool that cannot produce a real answer
/// renders its failure as text for the model to read. The loop never aborts
/// because a tool misbehaved.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Description advertised to the model alongside the signature.
    fn description(&self) -> &str;

    async fn call(&self, query: &str) -> String;
}

/// Fixed, ordered set of tools for the lifetime of the process.
///
/// Order matters: signatures are advertised to the model in registration
/// order, which nudges it toward trying memory before the open web.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Signatures for every registered tool, in registration order.
    pub fn signatures(&self) -> Vec<ToolSignature> {
        self.tools
            .iter()
            .map(|t| ToolSignature::new(t.name(), t.description(), query_schema(t.description())))
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echoes the query back"
        }

        async fn call(&self, query: &str) -> String {
            format!("echo: {}", query)
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new(vec![
            Arc::new(EchoTool { name: "first" }),
            Arc::new(EchoTool { name: "second" }),
        ])
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = registry();
        assert!(registry.get("first").is_some());
        assert!(registry.get("second").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_signatures_preserve_registration_order() {
        let registry = registry();
        let sigs = registry.signatures();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].function.name, "first");
        assert_eq!(sigs[1].function.name, "second");
        assert_eq!(sigs[0].function.parameters["required"][0], "query");
    }

    #[tokio::test]
    async fn test_tool_call_is_plain_text() {
        let registry = registry();
        let tool = registry.get("first").unwrap();
        assert_eq!(tool.call("hi").await, "echo: hi");
    }
}
