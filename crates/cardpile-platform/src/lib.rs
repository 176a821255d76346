//! Host abstraction traits so `cardpile-core` stays engine-agnostic.

use crossbeam_channel::Sender;
use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Local placement of one node: position plus a roll angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeTransform {
    pub position: Vec2,
    pub rotation: f32,
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: 0.0,
    };

    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_angle_translation(self.rotation.to_radians(), self.position)
    }
}

/// Creates, moves and destroys the visual that backs each node.
///
/// Once a handle is handed to the engine, the engine is the only caller that
/// moves it, until it passes the handle back to `destroy_visual`.
pub trait VisualFactory {
    type Handle;

    fn create_visual(&mut self) -> Self::Handle;
    fn destroy_visual(&mut self, handle: Self::Handle);
    fn set_local_position(&mut self, handle: &Self::Handle, position: Vec2);
    /// `degrees` is a roll about the pile's normal axis.
    fn set_local_rotation(&mut self, handle: &Self::Handle, degrees: f32);
}

/// Lifecycle notifications fired synchronously from `PileEngine::update`.
pub trait PileListener {
    /// The node is already placed and its visual already moved.
    fn node_added(&mut self, _index: usize, _node: &NodeTransform) {}
    /// The node and its visual still exist.
    fn node_removing(&mut self, _index: usize, _node: &NodeTransform) {}
    /// `index` no longer refers to a live node.
    fn node_removed(&mut self, _index: usize) {}
}

impl PileListener for () {}

impl<L: PileListener + ?Sized> PileListener for &mut L {
    fn node_added(&mut self, index: usize, node: &NodeTransform) {
        (**self).node_added(index, node);
    }
    fn node_removing(&mut self, index: usize, node: &NodeTransform) {
        (**self).node_removing(index, node);
    }
    fn node_removed(&mut self, index: usize) {
        (**self).node_removed(index);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PileEvent {
    Added { index: usize, node: NodeTransform },
    Removing { index: usize, node: NodeTransform },
    Removed { index: usize },
}

/// Forwards every notification into a channel, e.g. for a UI thread to drain.
pub struct ChannelListener {
    sender: Sender<PileEvent>,
}

impl ChannelListener {
    pub fn new(sender: Sender<PileEvent>) -> Self {
        Self { sender }
    }

    fn forward(&self, event: PileEvent) {
        if self.sender.send(event).is_err() {
            warn!("pile event channel closed; dropping {event:?}");
        }
    }
}

impl PileListener for ChannelListener {
    fn node_added(&mut self, index: usize, node: &NodeTransform) {
        self.forward(PileEvent::Added { index, node: *node });
    }
    fn node_removing(&mut self, index: usize, node: &NodeTransform) {
        self.forward(PileEvent::Removing { index, node: *node });
    }
    fn node_removed(&mut self, index: usize) {
        self.forward(PileEvent::Removed { index });
    }
}

type IndexCallback<'a> = Box<dyn FnMut(usize) + 'a>;

/// Plain closures in place of a listener type. Unset hooks are skipped.
#[derive(Default)]
pub struct PileCallbacks<'a> {
    on_added: Option<IndexCallback<'a>>,
    on_removing: Option<IndexCallback<'a>>,
    on_removed: Option<IndexCallback<'a>>,
}

impl<'a> PileCallbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_added(mut self, f: impl FnMut(usize) + 'a) -> Self {
        self.on_added = Some(Box::new(f));
        self
    }

    pub fn on_removing(mut self, f: impl FnMut(usize) + 'a) -> Self {
        self.on_removing = Some(Box::new(f));
        self
    }

    pub fn on_removed(mut self, f: impl FnMut(usize) + 'a) -> Self {
        self.on_removed = Some(Box::new(f));
        self
    }
}

impl PileListener for PileCallbacks<'_> {
    fn node_added(&mut self, index: usize, _node: &NodeTransform) {
        if let Some(f) = self.on_added.as_mut() {
            f(index);
        }
    }
    fn node_removing(&mut self, index: usize, _node: &NodeTransform) {
        if let Some(f) = self.on_removing.as_mut() {
            f(index);
        }
    }
    fn node_removed(&mut self, index: usize) {
        if let Some(f) = self.on_removed.as_mut() {
            f(index);
        }
    }
}
