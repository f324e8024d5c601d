//! Items: the widgets a system owns and ticks.

use std::any::Any;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::factory::{Factory, Handle};
use crate::hierarchy::{count_nodes, Hierarchy};
use crate::types::MAX_BATCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Generic UI unit.
    Widget,
    /// Font descriptor. Cells are monospace, so only the family is recorded.
    Font,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Widget => "widget",
            ItemKind::Font => "font",
        }
    }
}

/// Creation request: `count` independent items of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub kind: ItemKind,
    #[serde(default = "one")]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Widgets only: expire after this long.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_ms: Option<u64>,
}

fn one() -> usize {
    1
}

impl ItemRequest {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            count: 1,
            label: None,
            lifetime_ms: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime_ms = Some(lifetime.as_millis() as u64);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Alive,
    /// The owner destroys the item before the tick finishes.
    Expired,
}

pub trait Item {
    fn kind(&self) -> ItemKind;
    fn label(&self) -> &str;
    fn update(&mut self, dt: Duration) -> ItemState;

    /// Called when the host hierarchy changed.
    fn refresh(&mut self, _env: &dyn Hierarchy) {}

    /// Total time received through [`Item::update`].
    fn age(&self) -> Duration;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone)]
pub struct Widget {
    label: String,
    age: Duration,
    lifetime: Option<Duration>,
    observed_nodes: usize,
}

impl Widget {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            age: Duration::ZERO,
            lifetime: None,
            observed_nodes: 0,
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Node count of the hierarchy seen at the last refresh.
    pub fn observed_nodes(&self) -> usize {
        self.observed_nodes
    }
}

impl Item for Widget {
    fn kind(&self) -> ItemKind {
        ItemKind::Widget
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn update(&mut self, dt: Duration) -> ItemState {
        self.age += dt;
        match self.lifetime {
            Some(lifetime) if self.age >= lifetime => ItemState::Expired,
            _ => ItemState::Alive,
        }
    }

    fn refresh(&mut self, env: &dyn Hierarchy) {
        self.observed_nodes = count_nodes(env);
    }

    fn age(&self) -> Duration {
        self.age
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct Font {
    label: String,
    family: String,
    age: Duration,
}

impl Font {
    pub const DEFAULT_FAMILY: &'static str = "monospace";

    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            family: Self::DEFAULT_FAMILY.to_string(),
            age: Duration::ZERO,
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }
}

impl Item for Font {
    fn kind(&self) -> ItemKind {
        ItemKind::Font
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn update(&mut self, dt: Duration) -> ItemState {
        self.age += dt;
        ItemState::Alive
    }

    fn age(&self) -> Duration {
        self.age
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type ItemId = Handle<Box<dyn Item>>;

/// The per-system item registry.
pub struct Items {
    factory: Factory<Box<dyn Item>>,
    diag: Diagnostics,
}

impl Items {
    pub fn new(diag: Diagnostics) -> Self {
        Self {
            factory: Factory::new(),
            diag,
        }
    }

    /// Create the requested items. A request over [`MAX_BATCH`] creates nothing.
    pub fn create(&mut self, request: &ItemRequest) -> Vec<ItemId> {
        if request.count > MAX_BATCH {
            tracing::warn!(parent: self.diag.span(), kind = request.kind.as_str(), requested = request.count, max = MAX_BATCH, "item request too large, ignored");
            return Vec::new();
        }
        let base = request
            .label
            .clone()
            .unwrap_or_else(|| request.kind.as_str().to_string());
        let lifetime = request.lifetime_ms.map(Duration::from_millis);
        let ids = self.factory.produce(request.count, |i| {
            let label = if request.count == 1 {
                base.clone()
            } else {
                format!("{base}-{i}")
            };
            match request.kind {
                ItemKind::Widget => {
                    let widget = Widget::new(label);
                    Box::new(match lifetime {
                        Some(l) => widget.with_lifetime(l),
                        None => widget,
                    }) as Box<dyn Item>
                }
                ItemKind::Font => Box::new(Font::new(label)) as Box<dyn Item>,
            }
        });
        tracing::debug!(parent: self.diag.span(), kind = request.kind.as_str(), count = ids.len(), "items created");
        ids
    }

    /// Take ownership of an item built elsewhere.
    pub fn adopt(&mut self, item: Box<dyn Item>) -> ItemId {
        let id = self.factory.insert(item);
        tracing::debug!(parent: self.diag.span(), %id, "item adopted");
        id
    }

    pub fn destroy(&mut self, id: ItemId) -> bool {
        let destroyed = self.factory.destroy(id).is_some();
        if destroyed {
            tracing::debug!(parent: self.diag.span(), %id, "item destroyed");
        }
        destroyed
    }

    /// Update every item; expired ones are destroyed. Returns how many expired.
    pub fn tick(&mut self, dt: Duration) -> usize {
        let diag = &self.diag;
        self.factory.retain_mut(|id, item| match item.update(dt) {
            ItemState::Alive => true,
            ItemState::Expired => {
                tracing::debug!(parent: diag.span(), %id, label = item.label(), "item expired");
                false
            }
        })
    }

    pub fn refresh(&mut self, env: &dyn Hierarchy) {
        for (_, item) in self.factory.iter_mut() {
            item.refresh(env);
        }
    }

    /// Drop every item in creation order.
    pub fn teardown(&mut self) -> usize {
        let dropped = self.factory.teardown();
        if dropped > 0 {
            tracing::debug!(parent: self.diag.span(), dropped, "items torn down");
        }
        dropped
    }

    pub fn get(&self, id: ItemId) -> Option<&dyn Item> {
        self.factory.get(id).map(|item| item.as_ref())
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.factory.handles()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &dyn Item)> {
        self.factory.iter().map(|(id, item)| (id, item.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.factory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factory.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Node;

    fn items() -> Items {
        Items::new(Diagnostics::detached())
    }

    #[test]
    fn create_labels_batches() {
        let mut items = items();
        let ids = items.create(&ItemRequest::new(ItemKind::Font).with_count(2).with_label("ui"));
        let labels: Vec<&str> = ids.iter().filter_map(|id| items.get(*id)).map(|i| i.label()).collect();
        assert_eq!(labels, vec!["ui-0", "ui-1"]);

        let font = items.get(ids[0]).and_then(|i| i.as_any().downcast_ref::<Font>());
        assert_eq!(font.map(Font::family), Some("monospace"));
    }

    #[test]
    fn widgets_expire_during_tick() {
        let mut items = items();
        let short = items.create(&ItemRequest::new(ItemKind::Widget).with_lifetime(Duration::from_millis(20)));
        let forever = items.create(&ItemRequest::new(ItemKind::Widget));

        assert_eq!(items.tick(Duration::from_millis(10)), 0);
        assert_eq!(items.tick(Duration::from_millis(10)), 1);
        assert!(items.get(short[0]).is_none());
        assert_eq!(items.get(forever[0]).map(|i| i.age()), Some(Duration::from_millis(20)));
        assert!(!items.destroy(short[0]));
    }

    #[test]
    fn refresh_reaches_every_widget() {
        let mut items = items();
        let ids = items.create(&ItemRequest::new(ItemKind::Widget).with_count(2));
        let scene = Node::new("root").with_child(Node::new("a")).with_child(Node::new("b"));
        items.refresh(&scene);
        for id in ids {
            let widget = items.get(id).and_then(|i| i.as_any().downcast_ref::<Widget>());
            assert_eq!(widget.map(Widget::observed_nodes), Some(3));
        }
    }

    #[test]
    fn oversized_requests_create_nothing() {
        let mut items = items();
        let huge: ItemRequest =
            serde_json::from_str(r#"{"kind":"font","count":18446744073709551615}"#).unwrap();
        assert!(items.create(&huge).is_empty());
        assert!(items
            .create(&ItemRequest::new(ItemKind::Widget).with_count(MAX_BATCH + 1))
            .is_empty());
        assert!(items.is_empty());

        assert_eq!(
            items.create(&ItemRequest::new(ItemKind::Widget).with_count(MAX_BATCH)).len(),
            MAX_BATCH
        );
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let req: ItemRequest = serde_json::from_str(r#"{"kind":"widget"}"#).unwrap();
        assert_eq!(req, ItemRequest::new(ItemKind::Widget));
    }
}
