//! Arena DOM and the CSS subset the booking pages are located with.
//!
//! Supported: type, `*`, `.class`, `#id`, `[attr]`, `[attr=value]`,
//! `:first-child`, `:last-child`, `:has(...)`, `:not(...)`, descendant and
//! child combinators, and comma lists.

use crate::driver::ElementSnapshot;
use crate::locator::{contains_ignore_case, normalize_whitespace, Locator, Matchable, Selector};
use crate::result::{ProbeError, ProbeResult};
use std::collections::BTreeMap;

/// Node index in a [`Dom`]
pub type NodeId = usize;

/// What clicking a node does to the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Follow a link
    Navigate(String),
    /// Run the home-page availability search
    CheckAvailability,
    /// Page the calendar back one month
    CalendarBack,
    /// Page the calendar forward one month
    CalendarNext,
    /// Select a one-night stay starting on the cell's date
    SelectDay(chrono::NaiveDate),
    /// Open the guest form
    OpenGuestForm,
    /// Submit the guest form
    SubmitGuestForm,
    /// Close the guest form
    CancelGuestForm,
}

/// Which piece of site state a form control writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Search check-in
    CheckIn,
    /// Search check-out
    CheckOut,
    /// Guest first name
    FirstName,
    /// Guest last name
    LastName,
    /// Guest email
    Email,
    /// Guest phone
    Phone,
}

/// One element
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Lower-case tag
    pub tag: String,
    /// Attributes (`class` and `id` included)
    pub attributes: BTreeMap<String, String>,
    /// Own text, before children
    pub text: String,
    /// Form value
    pub value: Option<String>,
    /// Rendered
    pub visible: bool,
    /// Click behaviour
    pub action: Option<Action>,
    /// Fill target
    pub field: Option<Field>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Element from a compact `tag.class.class#id` spec
    #[must_use]
    pub fn el(spec: &str) -> Self {
        let mut node = Self {
            visible: true,
            ..Self::default()
        };
        let mut classes = Vec::new();
        let mut rest = spec;
        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        node.tag = rest[..tag_end].to_ascii_lowercase();
        rest = &rest[tag_end..];
        while !rest.is_empty() {
            let marker = rest.as_bytes()[0];
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            if marker == b'.' {
                classes.push(body[..end].to_string());
            } else {
                let _ = node.attributes.insert("id".into(), body[..end].to_string());
            }
            rest = &body[end..];
        }
        if !classes.is_empty() {
            let _ = node.attributes.insert("class".into(), classes.join(" "));
        }
        node
    }

    /// Set own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Set the click behaviour
    #[must_use]
    pub fn on_click(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Make this a form control bound to `field`
    #[must_use]
    pub fn bind(mut self, field: Field, value: &str) -> Self {
        self.field = Some(field);
        self.value = Some(value.to_string());
        self
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(String::as_str)
            .unwrap_or_default()
            .split_whitespace()
    }
}

/// An element tree
#[derive(Debug, Clone, Default)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    /// Empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `node` under `parent` (`None` = document root)
    pub fn push(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        let id = self.nodes.len();
        node.parent = parent;
        self.nodes.push(node);
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }

    /// Node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Parent of a node
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Concatenated text of the node and its subtree
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        let mut out = node.text.clone();
        for &child in &node.children {
            out.push_str(&self.text_content(child));
        }
        out
    }

    /// Rendered text: visible parts separated by newlines
    #[must_use]
    pub fn inner_text(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        if !node.visible {
            return String::new();
        }
        let mut parts = Vec::new();
        if !node.text.trim().is_empty() {
            parts.push(node.text.trim().to_string());
        }
        for &child in &node.children {
            let text = self.inner_text(child);
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join("\n")
    }

    /// Snapshot for the driver seam
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> ElementSnapshot {
        let node = &self.nodes[id];
        ElementSnapshot {
            tag: node.tag.clone(),
            inner_text: self.inner_text(id),
            text_content: self.text_content(id),
            value: node.value.clone(),
            attributes: node.attributes.clone(),
            visible: self.is_rendered(id),
        }
    }

    fn is_rendered(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(n) = cursor {
            if !self.nodes[n].visible {
                return false;
            }
            cursor = self.nodes[n].parent;
        }
        true
    }

    /// Descendants of `root` (`None` = every node) in document order
    fn descendants(&self, root: Option<NodeId>) -> Vec<NodeId> {
        let mut stack: Vec<NodeId> = match root {
            None => (0..self.nodes.len())
                .rev()
                .filter(|&n| self.nodes[n].parent.is_none())
                .collect(),
            Some(r) => self.nodes[r].children.iter().rev().copied().collect(),
        };
        let mut out = Vec::new();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev().copied());
        }
        out
    }

    /// `querySelectorAll` from `root` (`None` = document)
    pub fn query_css(&self, root: Option<NodeId>, css: &str) -> ProbeResult<Vec<NodeId>> {
        let list = parse_list(css)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|&n| list.iter().any(|c| self.matches_complex(n, c, c.len())))
            .collect())
    }

    /// Resolve a full locator chain to node ids in document order
    pub fn resolve(&self, locator: &Locator) -> ProbeResult<Vec<NodeId>> {
        let roots: Vec<Option<NodeId>> = match locator.parent() {
            Some(parent) => self.resolve(parent)?.into_iter().map(Some).collect(),
            None => vec![None],
        };
        let mut found = Vec::new();
        for root in roots {
            for id in self.resolve_selector(root, locator.selector())? {
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }
        let candidates: Vec<Resolved> = found
            .into_iter()
            .map(|id| Resolved {
                id,
                text: self.text_content(id),
            })
            .collect();
        Ok(locator.select(candidates).into_iter().map(|r| r.id).collect())
    }

    fn resolve_selector(&self, root: Option<NodeId>, selector: &Selector) -> ProbeResult<Vec<NodeId>> {
        match selector {
            Selector::Css(css) => self.query_css(root, css),
            Selector::Role { role, name } => Ok(self
                .descendants(root)
                .into_iter()
                .filter(|&n| self.has_role(n, role))
                .filter(|&n| contains_ignore_case(&self.accessible_name(n), name))
                .collect()),
            Selector::Label(text) => {
                let mut out = Vec::new();
                for n in self.descendants(root) {
                    let node = &self.nodes[n];
                    if node.tag == "label" && contains_ignore_case(&self.text_content(n), text) {
                        if let Some(target) = node.attributes.get("for") {
                            out.extend(
                                (0..self.nodes.len())
                                    .filter(|&i| self.nodes[i].attributes.get("id") == Some(target)),
                            );
                        }
                    } else if node
                        .attributes
                        .get("aria-label")
                        .is_some_and(|l| contains_ignore_case(l, text))
                    {
                        out.push(n);
                    }
                }
                out.sort_unstable();
                out.dedup();
                Ok(out)
            }
            Selector::Text(text) => Ok(self
                .descendants(root)
                .into_iter()
                .filter(|&n| contains_ignore_case(&self.text_content(n), text))
                .filter(|&n| {
                    !self.nodes[n]
                        .children
                        .iter()
                        .any(|&c| contains_ignore_case(&self.text_content(c), text))
                })
                .collect()),
        }
    }

    fn has_role(&self, id: NodeId, role: &str) -> bool {
        let node = &self.nodes[id];
        if node.attributes.get("role").is_some_and(|r| r == role) {
            return true;
        }
        match role {
            "button" => node.tag == "button",
            "link" => node.tag == "a" && node.attributes.contains_key("href"),
            "textbox" => node.tag == "textarea" || (node.tag == "input" && node.field.is_some()),
            "heading" => matches!(node.tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6"),
            _ => false,
        }
    }

    fn accessible_name(&self, id: NodeId) -> String {
        self.nodes[id]
            .attributes
            .get("aria-label")
            .cloned()
            .unwrap_or_else(|| normalize_whitespace(&self.text_content(id)))
    }

    fn matches_complex(&self, id: NodeId, complex: &[(Combinator, Compound)], upto: usize) -> bool {
        let Some((combinator, compound)) = upto.checked_sub(1).map(|i| &complex[i]) else {
            return true;
        };
        if !self.matches_compound(id, compound) {
            return false;
        }
        if upto == 1 {
            return true;
        }
        match combinator {
            Combinator::Child => self.nodes[id]
                .parent
                .is_some_and(|p| self.matches_complex(p, complex, upto - 1)),
            Combinator::Descendant => {
                let mut cursor = self.nodes[id].parent;
                while let Some(p) = cursor {
                    if self.matches_complex(p, complex, upto - 1) {
                        return true;
                    }
                    cursor = self.nodes[p].parent;
                }
                false
            }
        }
    }

    fn matches_compound(&self, id: NodeId, compound: &Compound) -> bool {
        let node = &self.nodes[id];
        if compound.tag.as_deref().is_some_and(|t| t != node.tag) {
            return false;
        }
        if compound.classes.iter().any(|c| !node.classes().any(|nc| nc == c)) {
            return false;
        }
        for (name, expected) in &compound.attributes {
            match (node.attributes.get(name), expected) {
                (None, _) => return false,
                (Some(actual), Some(want)) if actual != want => return false,
                _ => {}
            }
        }
        compound.pseudos.iter().all(|p| match p {
            Pseudo::FirstChild => self.sibling_position(id).is_some_and(|(i, _)| i == 0),
            Pseudo::LastChild => self.sibling_position(id).is_some_and(|(i, n)| i + 1 == n),
            Pseudo::Has(list) => self
                .descendants(Some(id))
                .into_iter()
                .any(|d| list.iter().any(|c| self.matches_complex(d, c, c.len()))),
            Pseudo::Not(list) => !list.iter().any(|c| self.matches_complex(id, c, c.len())),
        })
    }

    fn sibling_position(&self, id: NodeId) -> Option<(usize, usize)> {
        let parent = self.nodes[id].parent?;
        let siblings = &self.nodes[parent].children;
        siblings.iter().position(|&s| s == id).map(|i| (i, siblings.len()))
    }
}

struct Resolved {
    id: NodeId,
    text: String,
}

impl Matchable for Resolved {
    fn match_text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
    pseudos: Vec<Pseudo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    FirstChild,
    LastChild,
    Has(Vec<Complex>),
    Not(Vec<Complex>),
}

type Complex = Vec<(Combinator, Compound)>;

fn unsupported(css: &str, why: &str) -> ProbeError {
    ProbeError::page(format!("unsupported selector '{css}': {why}"))
}

/// Split on `sep` at bracket/paren depth zero
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, _) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_list(css: &str) -> ProbeResult<Vec<Complex>> {
    split_top_level(css, ',')
        .into_iter()
        .map(|part| parse_complex(part.trim(), css))
        .collect()
}

fn parse_complex(part: &str, whole: &str) -> ProbeResult<Complex> {
    let spaced = part.replace('>', " > ");
    let mut out = Vec::new();
    let mut next = Combinator::Descendant;
    for token in split_top_level(&spaced, ' ') {
        match token.trim() {
            "" => {}
            ">" => next = Combinator::Child,
            compound => {
                out.push((next, parse_compound(compound, whole)?));
                next = Combinator::Descendant;
            }
        }
    }
    if out.is_empty() {
        return Err(unsupported(whole, "empty selector"));
    }
    Ok(out)
}

fn parse_compound(input: &str, whole: &str) -> ProbeResult<Compound> {
    let mut compound = Compound::default();
    let bytes = input.as_bytes();
    let ident_end = |from: usize| {
        input[from..]
            .find(|c: char| matches!(c, '.' | '#' | '[' | ':'))
            .map_or(input.len(), |i| from + i)
    };

    let mut i = ident_end(0);
    match &input[..i] {
        "" | "*" => {}
        tag => compound.tag = Some(tag.to_ascii_lowercase()),
    }

    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                let end = ident_end(i + 1);
                compound.classes.push(input[i + 1..end].to_string());
                i = end;
            }
            b'#' => {
                let end = ident_end(i + 1);
                compound.attributes.push(("id".into(), Some(input[i + 1..end].to_string())));
                i = end;
            }
            b'[' => {
                let close = input[i..]
                    .find(']')
                    .map(|c| i + c)
                    .ok_or_else(|| unsupported(whole, "unclosed attribute"))?;
                let body = &input[i + 1..close];
                let attr = match body.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_string(),
                        Some(value.trim().trim_matches(['\'', '"']).to_string()),
                    ),
                    None => (body.trim().to_string(), None),
                };
                compound.attributes.push(attr);
                i = close + 1;
            }
            b':' => {
                let rest = &input[i + 1..];
                if let Some(stripped) = rest.strip_prefix("first-child") {
                    compound.pseudos.push(Pseudo::FirstChild);
                    i = input.len() - stripped.len();
                } else if let Some(stripped) = rest.strip_prefix("last-child") {
                    compound.pseudos.push(Pseudo::LastChild);
                    i = input.len() - stripped.len();
                } else if rest.starts_with("has(") || rest.starts_with("not(") {
                    let open = i + 4;
                    let close = matching_paren(input, open)
                        .ok_or_else(|| unsupported(whole, "unbalanced parenthesis"))?;
                    let inner = parse_list(&input[open + 1..close])?;
                    compound.pseudos.push(if rest.starts_with("has(") {
                        Pseudo::Has(inner)
                    } else {
                        Pseudo::Not(inner)
                    });
                    i = close + 1;
                } else {
                    return Err(unsupported(whole, "unknown pseudo-class"));
                }
            }
            _ => return Err(unsupported(whole, "unexpected character")),
        }
    }
    Ok(compound)
}

fn matching_paren(input: &str, open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, c) in input[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dom {
        let mut dom = Dom::new();
        let body = dom.push(None, Node::el("body"));
        let toolbar = dom.push(Some(body), Node::el("div.rbc-toolbar"));
        let group = dom.push(Some(toolbar), Node::el("span.rbc-btn-group"));
        let _ = dom.push(Some(group), Node::el("button").text("Back"));
        let _ = dom.push(Some(group), Node::el("button").text("Next"));
        let _ = dom.push(Some(toolbar), Node::el("span.rbc-toolbar-label").text("March 2027"));
        let col = dom.push(Some(body), Node::el("div.col-md-6"));
        let _ = dom.push(Some(col), Node::el("label").attr("for", "checkin").text("Check In"));
        let _ = dom.push(Some(col), Node::el("input#checkin").bind(Field::CheckIn, ""));
        let col = dom.push(Some(body), Node::el("div.col-md-6"));
        let _ = dom.push(Some(col), Node::el("label").attr("for", "checkout").text("Check Out"));
        let _ = dom.push(Some(col), Node::el("input#checkout").bind(Field::CheckOut, ""));
        let _ = dom.push(Some(body), Node::el("input").attr("aria-label", "Firstname").bind(Field::FirstName, ""));
        dom
    }

    mod css_tests {
        use super::*;

        fn texts(dom: &Dom, ids: &[NodeId]) -> Vec<String> {
            ids.iter().map(|&i| dom.text_content(i)).collect()
        }

        #[test]
        fn test_last_child_and_first_child() {
            let dom = sample();
            let next = dom.query_css(None, ".rbc-toolbar button:last-child").unwrap();
            assert_eq!(texts(&dom, &next), vec!["Next"]);
            let back = dom
                .query_css(None, ".rbc-toolbar .rbc-btn-group:first-child button:first-child")
                .unwrap();
            assert_eq!(texts(&dom, &back), vec!["Back"]);
        }

        #[test]
        fn test_has_with_attribute() {
            let dom = sample();
            let ids = dom
                .query_css(None, "div.col-md-6:has(label[for='checkout']) input")
                .unwrap();
            assert_eq!(ids.len(), 1);
            assert_eq!(dom.node(ids[0]).field, Some(Field::CheckOut));
        }

        #[test]
        fn test_child_combinator_and_lists() {
            let dom = sample();
            assert_eq!(dom.query_css(None, "body > div.col-md-6").unwrap().len(), 2);
            assert_eq!(dom.query_css(None, "body > input").unwrap().len(), 1);
            assert_eq!(dom.query_css(None, "label, span.rbc-toolbar-label").unwrap().len(), 3);
            assert_eq!(dom.query_css(None, "input:not([aria-label])").unwrap().len(), 2);
        }

        #[test]
        fn test_unsupported_pseudo_is_error() {
            let dom = sample();
            assert!(dom.query_css(None, "button:hover").is_err());
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_label_resolves_via_for_and_aria() {
            let dom = sample();
            let ids = dom.resolve(&Locator::label("Check In")).unwrap();
            assert_eq!(dom.node(ids[0]).field, Some(Field::CheckIn));
            let ids = dom.resolve(&Locator::label("FirstName")).unwrap();
            assert_eq!(dom.node(ids[0]).field, Some(Field::FirstName));
        }

        #[test]
        fn test_role_and_scope() {
            let dom = sample();
            let toolbar = Locator::new("div.rbc-toolbar");
            let next = Locator::role("button", "next").within(&toolbar);
            let ids = dom.resolve(&next).unwrap();
            assert_eq!(dom.text_content(ids[0]), "Next");
        }

        #[test]
        fn test_text_selector_is_innermost() {
            let dom = sample();
            let ids = dom.resolve(&Locator::text("March")).unwrap();
            assert_eq!(ids.len(), 1);
            assert_eq!(dom.node(ids[0]).tag, "span");
        }
    }

    #[test]
    fn test_inner_text_and_snapshot() {
        let mut dom = Dom::new();
        let cell = dom.push(None, Node::el("div.rbc-date-cell"));
        let _ = dom.push(Some(cell), Node::el("button.rbc-button-link").text("14"));
        let event = dom.push(Some(cell), Node::el("div.rbc-event"));
        let _ = dom.push(Some(event), Node::el("div.rbc-event-content").text("Unavailable"));
        assert_eq!(dom.text_content(cell), "14Unavailable");
        assert_eq!(dom.inner_text(cell), "14\nUnavailable");
        let snap = dom.snapshot(cell);
        assert!(snap.has_class("rbc-date-cell"));
        assert!(snap.visible);
    }
}
