//! Arena-allocated HTML tree.
//!
//! All nodes live in one vector and link to each other by index. Detached
//! nodes stay in the arena until they are explicitly freed; freed slots are
//! reused, and a per-slot generation keeps stale ids from resolving to the
//! new occupant.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName};

/// Slot and generation of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Sentinel for "no node".
    pub const NONE: NodeId = NodeId {
        index: u32::MAX,
        generation: 0,
    };

    pub fn is_some(&self) -> bool {
        self.index != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.index == u32::MAX
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Cached `id` attribute.
        id: Option<String>,
        /// Cached `class` tokens.
        classes: Vec<String>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct DomNode {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    generation: u32,
}

impl DomNode {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            generation: 0,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
pub struct Dom {
    nodes: Vec<DomNode>,
    /// Slots released by `free_subtree`, ready for reuse.
    free: Vec<u32>,
    document: NodeId,
    id_map: HashMap<String, NodeId>,
}

impl Dom {
    /// Create an empty tree holding only the document node.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            document: NodeId::NONE,
            id_map: HashMap::new(),
        };
        dom.document = dom.alloc(DomNode::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, mut node: DomNode) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.nodes[index as usize];
            let generation = slot.generation;
            node.generation = generation;
            *slot = node;
            return NodeId { index, generation };
        }
        let id = NodeId {
            index: self.nodes.len() as u32,
            generation: 0,
        };
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        if id.is_none() {
            return None;
        }
        self.nodes
            .get(id.index())
            .filter(|n| n.generation == id.generation)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut DomNode> {
        if id.is_none() {
            return None;
        }
        self.nodes
            .get_mut(id.index())
            .filter(|n| n.generation == id.generation)
    }

    /// Slot index of a live node, for side tables sized by [`len`](Self::len).
    pub fn slot(&self, id: NodeId) -> Option<usize> {
        self.get(id).map(|_| id.index())
    }

    /// Number of arena slots, including detached and free ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the document node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let (id, classes) = split_id_and_classes(&attrs);
        let node_id = self.alloc(DomNode::new(NodeData::Element {
            name,
            attrs,
            id: id.clone(),
            classes,
        }));
        if let Some(id) = id {
            self.id_map.entry(id).or_insert(node_id);
        }
        node_id
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(DomNode::new(NodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(DomNode::new(NodeData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(DomNode::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text, merging into a trailing text child when there is one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node (and its subtree) from its parent.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }

        self.forget_ids(target);
    }

    /// Move the children of `node` to the end of `new_parent`.
    pub fn reparent_children(&mut self, node: NodeId, new_parent: NodeId) {
        let children: Vec<_> = self.children(node).collect();
        for child in &children {
            if let Some(c) = self.get_mut(*child) {
                c.parent = NodeId::NONE;
                c.prev_sibling = NodeId::NONE;
                c.next_sibling = NodeId::NONE;
            }
        }
        if let Some(n) = self.get_mut(node) {
            n.first_child = NodeId::NONE;
            n.last_child = NodeId::NONE;
        }
        for child in children {
            self.append(new_parent, child);
        }
    }

    /// Set (or overwrite) an attribute on an element.
    pub fn set_attr(&mut self, target: NodeId, name: QualName, value: String) {
        let is_id = name.local.as_ref() == "id";
        let old_id = self.element_id(target).map(str::to_string);

        let Some(node) = self.get_mut(target) else {
            return;
        };
        let NodeData::Element {
            attrs, id, classes, ..
        } = &mut node.data
        else {
            return;
        };

        match attrs.iter_mut().find(|a| a.name.local == name.local) {
            Some(existing) => existing.value = value.clone(),
            None => attrs.push(Attribute {
                name,
                value: value.clone(),
            }),
        }
        let (new_id, new_classes) = split_id_and_classes(attrs);
        *id = new_id;
        *classes = new_classes;

        if is_id {
            if let Some(old) = old_id
                && self.id_map.get(&old) == Some(&target)
            {
                self.id_map.remove(&old);
                self.reindex_id(&old);
            }
            self.id_map.entry(value).or_insert(target);
        }
    }

    /// Remove an attribute from an element. Returns whether it was present.
    pub fn remove_attr(&mut self, target: NodeId, local: &str) -> bool {
        let old_id = self.element_id(target).map(str::to_string);

        let Some(node) = self.get_mut(target) else {
            return false;
        };
        let NodeData::Element {
            attrs, id, classes, ..
        } = &mut node.data
        else {
            return false;
        };

        let before = attrs.len();
        attrs.retain(|a| a.name.local.as_ref() != local);
        let removed = attrs.len() != before;
        let (new_id, new_classes) = split_id_and_classes(attrs);
        *id = new_id;
        *classes = new_classes;

        if removed
            && local == "id"
            && let Some(old) = old_id
            && self.id_map.get(&old) == Some(&target)
        {
            self.id_map.remove(&old);
            self.reindex_id(&old);
        }
        removed
    }

    /// Copy the subtree rooted at `source` in `other` under `parent` in `self`.
    ///
    /// Returns the id of the copied root.
    pub fn import_subtree(&mut self, other: &Dom, source: NodeId, parent: NodeId) -> NodeId {
        let mut root = NodeId::NONE;
        let mut stack = vec![(source, parent)];
        while let Some((source, parent)) = stack.pop() {
            let Some(node) = other.get(source) else {
                continue;
            };
            let copy = match &node.data {
                NodeData::Element { name, attrs, .. } => {
                    self.create_element(name.clone(), attrs.clone())
                }
                NodeData::Text(t) => self.create_text(t.clone()),
                NodeData::Comment(t) => self.create_comment(t.clone()),
                NodeData::Document | NodeData::Doctype { .. } => continue,
            };
            self.append(parent, copy);
            if root.is_none() {
                root = copy;
            }
            let children: Vec<_> = other.children(source).collect();
            stack.extend(children.into_iter().rev().map(|child| (child, copy)));
        }
        root
    }

    /// Release a detached subtree so its slots can be reused.
    ///
    /// Ids into the subtree stop resolving. Attached nodes are left alone.
    pub fn free_subtree(&mut self, root: NodeId) {
        if self.is_attached(root) {
            return;
        }
        self.forget_ids(root);
        let doomed: Vec<_> = self.subtree(root).collect();
        for id in doomed {
            let slot = &mut self.nodes[id.index()];
            *slot = DomNode {
                generation: slot.generation.wrapping_add(1),
                ..DomNode::new(NodeData::Comment(String::new()))
            };
            self.free.push(id.index);
        }
    }

    /// Number of nodes reachable from the document root.
    pub fn attached_len(&self) -> usize {
        self.subtree(self.document).count()
    }

    fn forget_ids(&mut self, root: NodeId) {
        let ids: Vec<(String, NodeId)> = self
            .subtree(root)
            .filter_map(|id| self.element_id(id).map(|s| (s.to_string(), id)))
            .collect();
        for (key, id) in ids {
            if self.id_map.get(&key) == Some(&id) {
                self.id_map.remove(&key);
                self.reindex_id(&key);
            }
        }
    }

    /// Point `key` at the first attached element still carrying it, if any.
    fn reindex_id(&mut self, key: &str) {
        let holder = self
            .subtree(self.document)
            .find(|&n| self.element_id(n) == Some(key));
        if let Some(holder) = holder {
            self.id_map.insert(key.to_string(), holder);
        }
    }

    /// Look up an attached element by its `id` attribute.
    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }

    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Pre-order traversal of `root` and everything below it.
    pub fn subtree(&self, root: NodeId) -> SubtreeIter<'_> {
        let stack = if self.get(root).is_some() {
            vec![root]
        } else {
            Vec::new()
        };
        SubtreeIter { dom: self, stack }
    }

    /// First node in pre-order matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.subtree(self.document)
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// First element with the given tag name.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(|node| {
            matches!(&node.data, NodeData::Element { name, .. } if name.local.as_ref() == tag)
        })
    }

    /// True when `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(n) = self.get(node) {
            if node == ancestor {
                return true;
            }
            node = n.parent;
        }
        false
    }

    /// True when `node` is reachable from the document root.
    pub fn is_attached(&self, mut node: NodeId) -> bool {
        while let Some(n) = self.get(node) {
            if node == self.document {
                return true;
            }
            node = n.parent;
        }
        false
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

fn split_id_and_classes(attrs: &[Attribute]) -> (Option<String>, Vec<String>) {
    let mut id = None;
    let mut classes = Vec::new();
    for attr in attrs {
        match attr.name.local.as_ref() {
            "id" => id = Some(attr.value.clone()),
            "class" => {
                classes = attr.value.split_whitespace().map(str::to_string).collect();
            }
            _ => {}
        }
    }
    (id, classes)
}

pub struct ChildrenIter<'a> {
    dom: &'a Dom,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self.dom.get(id).map(|n| n.next_sibling).unwrap_or(NodeId::NONE);
        Some(id)
    }
}

pub struct SubtreeIter<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for SubtreeIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Reverse push keeps left-to-right order.
        let children: Vec<_> = self.dom.children(id).collect();
        self.stack.extend(children.into_iter().rev());
        Some(id)
    }
}

/// Element accessors.
impl Dom {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    pub fn element_classes(&self, id: NodeId) -> &[String] {
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Next sibling that is an element, skipping text and comments.
    pub fn next_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.next_sibling;
        while current.is_some() {
            if self.is_element(current) {
                return Some(current);
            }
            current = self.get(current)?.next_sibling;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use super::*;

    fn qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: qname(name),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_create_and_lookup_by_id() {
        let mut dom = Dom::new();
        let div = dom.create_element(qname("div"), vec![attr("id", "main")]);
        dom.append(dom.document(), div);

        assert_eq!(dom.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.get_by_id("main"), Some(div));
    }

    #[test]
    fn test_subtree_is_preorder() {
        let mut dom = Dom::new();
        let a = dom.create_element(qname("div"), vec![]);
        let b = dom.create_element(qname("p"), vec![]);
        let c = dom.create_element(qname("p"), vec![]);
        let d = dom.create_element(qname("span"), vec![]);
        dom.append(dom.document(), a);
        dom.append(a, b);
        dom.append(b, d);
        dom.append(a, c);

        let order: Vec<_> = dom.subtree(a).collect();
        assert_eq!(order, vec![a, b, d, c]);
    }

    #[test]
    fn test_detach_relinks_siblings_and_forgets_ids() {
        let mut dom = Dom::new();
        let parent = dom.create_element(qname("div"), vec![]);
        let first = dom.create_element(qname("p"), vec![]);
        let middle = dom.create_element(qname("p"), vec![attr("id", "gone")]);
        let last = dom.create_element(qname("p"), vec![]);
        dom.append(dom.document(), parent);
        dom.append(parent, first);
        dom.append(parent, middle);
        dom.append(parent, last);

        dom.detach(middle);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![first, last]);
        assert_eq!(dom.get_by_id("gone"), None);
        assert!(!dom.is_attached(middle));
        assert!(dom.is_attached(last));
    }

    #[test]
    fn test_set_and_remove_attr_refresh_caches() {
        let mut dom = Dom::new();
        let div = dom.create_element(qname("div"), vec![attr("class", "a")]);
        dom.append(dom.document(), div);

        dom.set_attr(div, qname("class"), "card message".to_string());
        assert_eq!(dom.element_classes(div), ["card", "message"]);

        dom.set_attr(div, qname("id"), "x".to_string());
        assert_eq!(dom.get_by_id("x"), Some(div));

        assert!(dom.remove_attr(div, "id"));
        assert_eq!(dom.get_by_id("x"), None);
        assert!(!dom.remove_attr(div, "id"));
    }

    #[test]
    fn test_text_merging() {
        let mut dom = Dom::new();
        let p = dom.create_element(qname("p"), vec![]);
        dom.append(dom.document(), p);

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text_content(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_import_subtree_copies_structure() {
        let mut src = Dom::new();
        let ul = src.create_element(qname("ul"), vec![]);
        let li = src.create_element(qname("li"), vec![attr("id", "item")]);
        src.append(src.document(), ul);
        src.append(ul, li);
        src.append_text(li, "one");

        let mut dst = Dom::new();
        let copied = dst.import_subtree(&src, ul, dst.document());

        assert_eq!(dst.element_name(copied).unwrap().as_ref(), "ul");
        let li_copy = dst.get_by_id("item").unwrap();
        let text = dst.children(li_copy).next().unwrap();
        assert_eq!(dst.text_content(text), Some("one"));
    }

    #[test]
    fn test_duplicate_id_falls_back_to_remaining_holder() {
        let mut dom = Dom::new();
        let first = dom.create_element(qname("span"), vec![attr("id", "x")]);
        let second = dom.create_element(qname("span"), vec![attr("id", "x")]);
        dom.append(dom.document(), first);
        dom.append(dom.document(), second);
        assert_eq!(dom.get_by_id("x"), Some(first));

        dom.detach(first);
        assert_eq!(dom.get_by_id("x"), Some(second));

        assert!(dom.remove_attr(second, "id"));
        assert_eq!(dom.get_by_id("x"), None);
    }

    #[test]
    fn test_free_subtree_reuses_slots_with_new_generation() {
        let mut dom = Dom::new();
        let div = dom.create_element(qname("div"), vec![attr("id", "d")]);
        let p = dom.create_element(qname("p"), vec![]);
        dom.append(dom.document(), div);
        dom.append(div, p);
        let len = dom.len();

        dom.detach(div);
        dom.free_subtree(div);
        assert!(dom.get(div).is_none());
        assert!(dom.get(p).is_none());
        assert_eq!(dom.get_by_id("d"), None);

        let fresh = dom.create_element(qname("section"), vec![]);
        assert_eq!(dom.len(), len);
        assert!(dom.get(fresh).is_some());
        assert_ne!(fresh, div);
        assert_ne!(fresh, p);
    }

    #[test]
    fn test_free_subtree_ignores_attached_nodes() {
        let mut dom = Dom::new();
        let div = dom.create_element(qname("div"), vec![]);
        dom.append(dom.document(), div);
        dom.free_subtree(div);
        assert!(dom.is_attached(div));
    }

    #[test]
    fn test_import_deep_subtree() {
        let mut src = Dom::new();
        let mut parent = src.document();
        for _ in 0..20_000 {
            let div = src.create_element(qname("div"), vec![]);
            src.append(parent, div);
            parent = div;
        }
        src.append_text(parent, "leaf");
        let top = src.children(src.document()).next().unwrap();

        let mut dst = Dom::new();
        let copied = dst.import_subtree(&src, top, dst.document());
        assert_eq!(dst.subtree(copied).count(), 20_001);
    }
}
