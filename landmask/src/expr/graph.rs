//! Serialized expression graph types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key of the root node in a single-tree expression.
const ROOT_KEY: &str = "0";

/// A complete expression graph as submitted to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Key of the node whose value is the result of the expression.
    pub result: String,

    /// Named value nodes.
    pub values: BTreeMap<String, ValueNode>,
}

impl Expression {
    /// Create an expression consisting of one nested tree.
    pub fn single(root: ValueNode) -> Self {
        let mut values = BTreeMap::new();
        values.insert(ROOT_KEY.to_string(), root);
        Self {
            result: ROOT_KEY.to_string(),
            values,
        }
    }

    /// The node referenced by `result`, if present.
    pub fn root(&self) -> Option<&ValueNode> {
        self.values.get(&self.result)
    }
}

/// A single node of the expression graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueNode {
    /// A literal JSON value.
    #[serde(rename = "constantValue")]
    Constant(serde_json::Value),

    /// A call to a platform function.
    #[serde(rename = "functionInvocationValue")]
    Invocation(FunctionInvocation),
}

impl ValueNode {
    /// Create a constant node.
    pub fn constant(value: impl Into<serde_json::Value>) -> Self {
        Self::Constant(value.into())
    }

    /// Create a function invocation node.
    pub fn invoke<'a>(
        function_name: &str,
        arguments: impl IntoIterator<Item = (&'a str, ValueNode)>,
    ) -> Self {
        Self::Invocation(FunctionInvocation {
            function_name: function_name.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        })
    }
}

/// A platform function call with named arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    /// Fully qualified function name, e.g. `Image.updateMask`.
    pub function_name: String,

    /// Arguments by parameter name.
    pub arguments: BTreeMap<String, ValueNode>,
}
