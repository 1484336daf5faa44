//! Static extraction of class-name strings from attribute expressions.
//!
//! Dialect adapters (JSX, Vue, Svelte, HTML) normalize an attribute value
//! into an [`ExpressionNode`] tree. Extraction is purely structural: nothing
//! is ever evaluated, and shapes that cannot be resolved statically yield
//! nothing.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized expression tree handed over by a dialect adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExpressionNode {
    Literal {
        value: Value,
    },
    TemplateLiteral {
        quasis: Vec<TemplateElement>,
        #[serde(default)]
        expressions: Vec<ExpressionNode>,
    },
    Conditional {
        test: Box<ExpressionNode>,
        consequent: Box<ExpressionNode>,
        alternate: Box<ExpressionNode>,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    Call {
        callee: Box<ExpressionNode>,
        #[serde(default)]
        arguments: Vec<ExpressionNode>,
    },
    ArrayLit {
        /// `None` is a hole (`[a, , b]`)
        elements: Vec<Option<ExpressionNode>>,
    },
    ObjectLit {
        properties: Vec<ObjectMember>,
    },
    Identifier {
        name: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateElement {
    pub cooked: Option<String>,
    #[serde(default)]
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "??")]
    NullishCoalescing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    Property {
        key: PropertyKey,
        value: ExpressionNode,
        #[serde(default)]
        computed: bool,
        #[serde(default)]
        shorthand: bool,
    },
    Spread {
        argument: ExpressionNode,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropertyKey {
    Literal { value: Value },
    Identifier { name: String },
}

/// How object literals contribute class strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// `clsx({ "font-bold": isActive })`: keys are the class names.
    #[default]
    Keys,
    /// `classes={{ root: "p-4", label: "text-sm" }}`: values hold class strings.
    Values,
}

impl ExpressionNode {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal {
            value: Value::String(value.into()),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier { name: name.into() }
    }
}

/// Collect every statically-known string the expression could evaluate to.
///
/// Fragments come out in source order (pre-order, left to right). The walk
/// uses an explicit stack so deeply nested trees cannot overflow.
pub fn extract(node: &ExpressionNode, mode: ExtractMode) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack: Vec<&ExpressionNode> = vec![node];

    while let Some(node) = stack.pop() {
        match node {
            ExpressionNode::Literal { value } => {
                if let Value::String(s) = value {
                    out.push(s.clone());
                }
            }
            ExpressionNode::TemplateLiteral { quasis, expressions } => {
                // Any interpolation makes the base/variant boundary unknowable
                if expressions.is_empty() && quasis.len() == 1 {
                    if let Some(cooked) = &quasis[0].cooked {
                        out.push(cooked.clone());
                    }
                }
            }
            ExpressionNode::Conditional {
                consequent,
                alternate,
                ..
            } => {
                stack.push(alternate);
                stack.push(consequent);
            }
            ExpressionNode::Logical { left, right, .. } => {
                stack.push(right);
                stack.push(left);
            }
            ExpressionNode::Call { arguments, .. } => {
                stack.extend(arguments.iter().rev());
            }
            ExpressionNode::ArrayLit { elements } => {
                stack.extend(elements.iter().rev().flatten());
            }
            ExpressionNode::ObjectLit { properties } => match mode {
                ExtractMode::Keys => {
                    for member in properties {
                        if let ObjectMember::Property {
                            key,
                            computed: false,
                            ..
                        } = member
                        {
                            match key {
                                PropertyKey::Literal {
                                    value: Value::String(s),
                                } => out.push(s.clone()),
                                PropertyKey::Identifier { name } => out.push(name.clone()),
                                PropertyKey::Literal { .. } => {}
                            }
                        }
                    }
                }
                ExtractMode::Values => {
                    let values = properties.iter().rev().filter_map(|member| match member {
                        ObjectMember::Property { value, .. } => Some(value),
                        ObjectMember::Spread { .. } => None,
                    });
                    stack.extend(values);
                }
            },
            ExpressionNode::Identifier { .. } | ExpressionNode::Unknown => {}
        }
    }

    out
}

/// Split a whitespace-joined class string into individual tokens.
pub fn extract_class_names_from_string(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Tokenize extracted fragments into a deduplicated, order-preserving set.
pub fn collect_class_names<I, S>(fragments: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names = IndexSet::new();
    for fragment in fragments {
        for name in fragment.as_ref().split_whitespace() {
            names.insert(name.to_string());
        }
    }
    names
}

/// Extract and tokenize in one step.
pub fn extract_class_names(node: &ExpressionNode, mode: ExtractMode) -> IndexSet<String> {
    collect_class_names(extract(node, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lit(s: &str) -> ExpressionNode {
        ExpressionNode::string(s)
    }

    fn boxed(node: ExpressionNode) -> Box<ExpressionNode> {
        Box::new(node)
    }

    #[test]
    fn test_string_literal_only() {
        assert_eq!(extract(&lit("p-4 flex"), ExtractMode::Keys), vec!["p-4 flex"]);
        let number = ExpressionNode::Literal { value: json!(42) };
        assert!(extract(&number, ExtractMode::Keys).is_empty());
    }

    #[test]
    fn test_template_literal_without_interpolation() {
        let tpl = ExpressionNode::TemplateLiteral {
            quasis: vec![TemplateElement {
                cooked: Some("flex gap-2".to_string()),
                raw: "flex gap-2".to_string(),
            }],
            expressions: vec![],
        };
        assert_eq!(extract(&tpl, ExtractMode::Keys), vec!["flex gap-2"]);

        let bad_escape = ExpressionNode::TemplateLiteral {
            quasis: vec![TemplateElement {
                cooked: None,
                raw: "\\unicode".to_string(),
            }],
            expressions: vec![],
        };
        assert!(extract(&bad_escape, ExtractMode::Keys).is_empty());
    }

    #[test]
    fn test_template_literal_with_interpolation_is_skipped() {
        let tpl = ExpressionNode::TemplateLiteral {
            quasis: vec![
                TemplateElement {
                    cooked: Some("bg-".to_string()),
                    raw: "bg-".to_string(),
                },
                TemplateElement {
                    cooked: Some("-500 p-4".to_string()),
                    raw: "-500 p-4".to_string(),
                },
            ],
            expressions: vec![ExpressionNode::identifier("color")],
        };
        assert!(extract(&tpl, ExtractMode::Keys).is_empty());
    }

    #[test]
    fn test_conditional_and_logical_take_both_branches() {
        let cond = ExpressionNode::Conditional {
            test: boxed(ExpressionNode::identifier("active")),
            consequent: boxed(lit("bg-blue-500")),
            alternate: boxed(lit("bg-gray-200")),
        };
        assert_eq!(
            extract(&cond, ExtractMode::Keys),
            vec!["bg-blue-500", "bg-gray-200"]
        );

        for operator in [
            LogicalOperator::And,
            LogicalOperator::Or,
            LogicalOperator::NullishCoalescing,
        ] {
            let logical = ExpressionNode::Logical {
                operator,
                left: boxed(lit("a")),
                right: boxed(lit("b")),
            };
            assert_eq!(extract(&logical, ExtractMode::Keys), vec!["a", "b"]);
        }
    }

    #[test]
    fn test_call_arguments_and_arrays() {
        let call = ExpressionNode::Call {
            callee: boxed(ExpressionNode::identifier("clsx")),
            arguments: vec![
                lit("px-4"),
                ExpressionNode::ArrayLit {
                    elements: vec![Some(lit("py-2")), None, Some(ExpressionNode::identifier("x"))],
                },
                ExpressionNode::Unknown,
            ],
        };
        assert_eq!(extract(&call, ExtractMode::Keys), vec!["px-4", "py-2"]);
    }

    #[test]
    fn test_object_keys_mode() {
        let obj = ExpressionNode::ObjectLit {
            properties: vec![
                ObjectMember::Property {
                    key: PropertyKey::Literal { value: json!("font-bold") },
                    value: ExpressionNode::identifier("isActive"),
                    computed: false,
                    shorthand: false,
                },
                ObjectMember::Property {
                    key: PropertyKey::Identifier { name: "dynamic".to_string() },
                    value: lit("ignored"),
                    computed: true,
                    shorthand: false,
                },
                ObjectMember::Spread {
                    argument: lit("spread-ignored"),
                },
                ObjectMember::Property {
                    key: PropertyKey::Identifier { name: "underline".to_string() },
                    value: ExpressionNode::identifier("underline"),
                    computed: false,
                    shorthand: true,
                },
            ],
        };
        assert_eq!(extract(&obj, ExtractMode::Keys), vec!["font-bold", "underline"]);
    }

    #[test]
    fn test_object_values_mode() {
        let obj = ExpressionNode::ObjectLit {
            properties: vec![
                ObjectMember::Property {
                    key: PropertyKey::Identifier { name: "root".to_string() },
                    value: lit("p-4"),
                    computed: false,
                    shorthand: false,
                },
                ObjectMember::Property {
                    key: PropertyKey::Identifier { name: "label".to_string() },
                    value: ExpressionNode::Conditional {
                        test: boxed(ExpressionNode::identifier("small")),
                        consequent: boxed(lit("text-sm")),
                        alternate: boxed(lit("text-lg")),
                    },
                    computed: true,
                    shorthand: false,
                },
                ObjectMember::Spread {
                    argument: lit("nope"),
                },
            ],
        };
        assert_eq!(
            extract(&obj, ExtractMode::Values),
            vec!["p-4", "text-sm", "text-lg"]
        );
    }

    #[test]
    fn test_identifier_and_unknown_yield_nothing() {
        assert!(extract(&ExpressionNode::identifier("cls"), ExtractMode::Keys).is_empty());
        assert!(extract(&ExpressionNode::Unknown, ExtractMode::Values).is_empty());
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut node = lit("leaf");
        for _ in 0..100_000 {
            node = ExpressionNode::ArrayLit {
                elements: vec![Some(node)],
            };
        }
        assert_eq!(extract(&node, ExtractMode::Keys), vec!["leaf"]);
        // Drop iteratively so the test itself does not recurse on the way out
        let mut current = Some(node);
        while let Some(ExpressionNode::ArrayLit { mut elements }) = current {
            current = elements.pop().flatten();
        }
    }

    #[test]
    fn test_class_name_tokenization() {
        assert_eq!(extract_class_names_from_string("a  b\tc"), vec!["a", "b", "c"]);
        assert!(extract_class_names_from_string("").is_empty());
        assert!(extract_class_names_from_string("   \n ").is_empty());

        let names = collect_class_names(["p-4 flex", " flex  m-2 ", "p-4"]);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["p-4", "flex", "m-2"]
        );
    }

    #[test]
    fn test_deserialize_adapter_json() {
        let node: ExpressionNode = serde_json::from_value(json!({
            "type": "Call",
            "callee": { "type": "Identifier", "name": "cn" },
            "arguments": [
                { "type": "Literal", "value": "p-4 flex" },
                { "type": "Logical", "operator": "&&",
                  "left": { "type": "Identifier", "name": "on" },
                  "right": { "type": "Literal", "value": "ring-2" } },
                { "type": "MemberExpression" }
            ]
        }))
        .unwrap();

        let names = extract_class_names(&node, ExtractMode::Keys);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["p-4", "flex", "ring-2"]
        );
    }
}
