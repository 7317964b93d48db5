//! Symbol allocation for generated code
//!
//! Every import path and every `(import, receiver)` pair referenced by the IR
//! gets a short alias. Collection is order-insensitive; finalization sorts
//! before assigning, so the same IR always yields the same table.
//!
//! Aliases read like spreadsheet columns, least-significant letter first,
//! with a role suffix: imports end in `i`, receivers in `r`.
//!
//! | index | import | receiver |
//! |------:|--------|----------|
//! | 0     | `ai`   | `ar`     |
//! | 25    | `zi`   | `zr`     |
//! | 26    | `azi`  | `azr`    |
//! | 52    | `azzi` | `azzr`   |

use crate::error::{Error, Result};
use crate::ir::{HandlerRef, PathNode};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

const IMPORT_SUFFIX: char = 'i';
const RECEIVER_SUFFIX: char = 'r';

/// Letter sequence for the `n`-th allocation, without role suffix
pub fn ident(n: usize) -> String {
    let letter = (b'a' + (n % 26) as u8) as char;
    let mut out = String::with_capacity(1 + n / 26);
    out.push(letter);
    out.extend(std::iter::repeat_n('z', n / 26));
    out
}

/// A receiver type, keyed by where it lives and how it is bound
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ReceiverKey {
    pub import: String,
    pub name: String,
    pub pointer: bool,
}

impl ReceiverKey {
    fn of(handler: &HandlerRef) -> Option<Self> {
        handler.receiver.as_ref().map(|r| Self {
            import: handler.import.clone(),
            name: r.name.clone(),
            pointer: r.pointer,
        })
    }
}

/// Unordered collection pass
#[derive(Debug, Default)]
pub struct SymbolCollector {
    imports: HashSet<String>,
    receivers: HashSet<ReceiverKey>,
}

impl SymbolCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_import(&mut self, import: &str) {
        if !import.is_empty() {
            self.imports.insert(import.to_string());
        }
    }

    pub fn add_handler(&mut self, handler: &HandlerRef) {
        self.add_import(&handler.import);
        if let Some(key) = ReceiverKey::of(handler) {
            self.receivers.insert(key);
        }
    }

    /// Register everything a tree references
    pub fn visit(&mut self, root: &PathNode) {
        for node in root.walk() {
            for mw in &node.middleware {
                self.add_handler(mw);
            }
            for ep in &node.endpoints {
                self.add_import(&ep.body.import);
                self.add_import(&ep.response.import);
                self.add_handler(&ep.handler);
                for mw in &ep.middleware {
                    self.add_handler(mw);
                }
            }
        }
    }

    /// Sort and assign aliases
    pub fn finalize(self) -> SymbolTable {
        let mut imports: Vec<String> = self.imports.into_iter().collect();
        imports.sort();
        let mut receivers: Vec<ReceiverKey> = self.receivers.into_iter().collect();
        receivers.sort();

        let imports = imports
            .into_iter()
            .enumerate()
            .map(|(n, import)| (import, format!("{}{}", ident(n), IMPORT_SUFFIX)))
            .collect();
        let receivers = receivers
            .into_iter()
            .enumerate()
            .map(|(n, key)| (key, format!("{}{}", ident(n), RECEIVER_SUFFIX)))
            .collect();

        SymbolTable { imports, receivers }
    }
}

/// Allocated aliases; read-only once built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    imports: BTreeMap<String, String>,
    receivers: BTreeMap<ReceiverKey, String>,
}

impl SymbolTable {
    /// Collect and finalize in one go
    pub fn allocate(root: &PathNode) -> Self {
        let mut collector = SymbolCollector::new();
        collector.visit(root);
        let table = collector.finalize();
        tracing::debug!(
            imports = table.imports.len(),
            receivers = table.receivers.len(),
            "symbols allocated"
        );
        table
    }

    /// `(import, alias)` in sorted import order
    pub fn imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.imports.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `(receiver, alias)` in sorted receiver order
    pub fn receivers(&self) -> impl Iterator<Item = (&ReceiverKey, &str)> {
        self.receivers.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn import_ident(&self, import: &str) -> Result<&str> {
        self.imports
            .get(import)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingSymbol(import.to_string()))
    }

    pub fn receiver_ident(&self, key: &ReceiverKey) -> Result<&str> {
        self.receivers
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingSymbol(format!("{}.{}", key.import, key.name)))
    }

    /// Alias a handler is called through: its receiver if bound, else its import
    pub fn handler_ident(&self, handler: &HandlerRef) -> Result<&str> {
        match ReceiverKey::of(handler) {
            Some(key) => self.receiver_ident(&key),
            None => self.import_ident(&handler.import),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.receivers.is_empty()
    }

    /// JSON-friendly view of the table
    pub fn dump(&self) -> SymbolDump {
        SymbolDump {
            imports: self
                .imports()
                .map(|(import, ident)| ImportSymbol {
                    ident: ident.to_string(),
                    import: import.to_string(),
                })
                .collect(),
            receivers: self
                .receivers()
                .map(|(key, ident)| ReceiverSymbol {
                    ident: ident.to_string(),
                    receiver: key.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolDump {
    pub imports: Vec<ImportSymbol>,
    pub receivers: Vec<ReceiverSymbol>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSymbol {
    pub ident: String,
    pub import: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiverSymbol {
    pub ident: String,
    #[serde(flatten)]
    pub receiver: ReceiverKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "a")]
    #[case(1, "b")]
    #[case(25, "z")]
    #[case(26, "az")]
    #[case(27, "bz")]
    #[case(51, "zz")]
    #[case(52, "azz")]
    #[case(78, "azzz")]
    fn test_ident_sequence(#[case] n: usize, #[case] expected: &str) {
        assert_eq!(ident(n), expected);
    }

    #[test]
    fn test_idents_are_unique() {
        let all: HashSet<String> = (0..500).map(ident).collect();
        assert_eq!(all.len(), 500);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let handlers = [
            HandlerRef::method("github.com/b/users", "Service", true, "Get"),
            HandlerRef::method("github.com/a/orders", "Service", false, "List"),
            HandlerRef::method("github.com/a/orders", "Service", true, "Create"),
            HandlerRef::function("github.com/c/mw", "Log"),
        ];

        let mut forward = SymbolCollector::new();
        handlers.iter().for_each(|h| forward.add_handler(h));
        let mut backward = SymbolCollector::new();
        handlers.iter().rev().for_each(|h| backward.add_handler(h));

        let a = forward.finalize();
        let b = backward.finalize();
        assert_eq!(a, b);

        let imports: Vec<(&str, &str)> = a.imports().collect();
        assert_eq!(
            imports,
            vec![
                ("github.com/a/orders", "ai"),
                ("github.com/b/users", "bi"),
                ("github.com/c/mw", "ci"),
            ]
        );
        // pointer=false sorts before pointer=true
        let receivers: Vec<(bool, &str)> = a.receivers().map(|(k, id)| (k.pointer, id)).collect();
        assert_eq!(receivers, vec![(false, "ar"), (true, "br"), (true, "cr")]);
    }

    #[test]
    fn test_handler_ident_prefers_receiver() {
        let bound = HandlerRef::method("github.com/a/users", "Service", true, "Get");
        let free = HandlerRef::function("github.com/a/users", "Health");
        let mut c = SymbolCollector::new();
        c.add_handler(&bound);
        c.add_handler(&free);
        let table = c.finalize();
        assert_eq!(table.handler_ident(&bound).unwrap(), "ar");
        assert_eq!(table.handler_ident(&free).unwrap(), "ai");
    }

    #[test]
    fn test_missing_symbol_is_internal() {
        let table = SymbolTable::default();
        assert!(table.is_empty());
        assert!(matches!(
            table.import_ident("github.com/none"),
            Err(Error::MissingSymbol(_))
        ));
    }

    #[test]
    fn test_empty_imports_are_skipped() {
        let mut c = SymbolCollector::new();
        c.add_import("");
        assert!(c.finalize().is_empty());
    }
}
