use cardpile_platform::{NodeTransform, PileListener, VisualFactory};
use glam::Vec2;
use tracing::{debug, trace};

use crate::config::{PileConfig, PileControls};
use crate::layout::PileLayout;
use crate::snapshot::{CardInstance, PileSnapshot};

struct PileNode<H> {
    position: Vec2,
    offset: Vec2,
    rotation: f32,
    visual: H,
}

impl<H> PileNode<H> {
    fn transform(&self) -> NodeTransform {
        NodeTransform::new(self.position, self.rotation)
    }

    fn apply<F: VisualFactory<Handle = H>>(&mut self, transform: NodeTransform, factory: &mut F) {
        self.position = transform.position;
        self.rotation = transform.rotation;
        factory.set_local_position(&self.visual, self.position);
        factory.set_local_rotation(&self.visual, self.rotation);
    }
}

/// Keeps a tail-grown list of nodes in step with the count derived from
/// [`PileControls`], and lays them out along the pile's curve.
///
/// Nothing changes until [`PileEngine::update`]: control tweaks, offsets and
/// config swaps only take effect there.
pub struct PileEngine<H> {
    config: PileConfig,
    controls: PileControls,
    nodes: Vec<PileNode<H>>,
}

impl<H> PileEngine<H> {
    pub fn new(config: PileConfig) -> Self {
        Self::with_controls(config, PileControls::default())
    }

    pub fn with_controls(config: PileConfig, controls: PileControls) -> Self {
        Self {
            config,
            controls,
            nodes: Vec::new(),
        }
    }

    pub fn config(&self) -> &PileConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PileConfig) {
        self.config = config;
    }

    pub fn controls(&self) -> &PileControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut PileControls {
        &mut self.controls
    }

    /// Target node count, always re-derived from the controls.
    pub fn current_node_count(&self) -> usize {
        self.controls.node_count(&self.config)
    }

    /// Number of live nodes. Matches [`Self::current_node_count`] after `update`.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Raises the target by one node. Takes effect on the next `update`.
    pub fn request_grow(&mut self) {
        self.set_node_count(self.current_node_count() + 1);
    }

    /// Lowers the target by one node. Takes effect on the next `update`.
    pub fn request_shrink(&mut self) {
        self.set_node_count(self.current_node_count().saturating_sub(1));
    }

    /// Integer form of the nodes amount; snaps the amount onto the count grid.
    /// Counts above `max_node_count` saturate.
    pub fn set_node_count(&mut self, count: usize) {
        if self.config.max_node_count == 0 {
            return;
        }
        self.controls
            .set_nodes_amount(count as f32 / self.config.max_node_count as f32);
    }

    pub fn position(&self, index: usize) -> Vec2 {
        self.nodes.get(index).map_or(Vec2::ZERO, |n| n.position)
    }

    pub fn position_offset(&self, index: usize) -> Vec2 {
        self.nodes.get(index).map_or(Vec2::ZERO, |n| n.offset)
    }

    /// Roll in degrees; 0 for an out-of-range index.
    pub fn rotation(&self, index: usize) -> f32 {
        self.nodes.get(index).map_or(0.0, |n| n.rotation)
    }

    pub fn visual_handle(&self, index: usize) -> Option<&H> {
        self.nodes.get(index).map(|n| &n.visual)
    }

    pub fn node_transform(&self, index: usize) -> NodeTransform {
        self.nodes
            .get(index)
            .map_or(NodeTransform::IDENTITY, PileNode::transform)
    }

    pub fn transforms(&self) -> Vec<NodeTransform> {
        self.nodes.iter().map(PileNode::transform).collect()
    }

    /// Ignored for an out-of-range index. Applied on the next `update`.
    pub fn set_position_offset(&mut self, index: usize, offset: Vec2) {
        match self.nodes.get_mut(index) {
            Some(node) => node.offset = offset,
            None => trace!("ignoring offset for node {index}; pile has {}", self.nodes.len()),
        }
    }

    /// Reconciles the node list against the target count, then re-lays out
    /// every node relative to `origin` and pushes the result to its visual.
    pub fn update<F, L>(&mut self, origin: Vec2, factory: &mut F, listener: &mut L)
    where
        F: VisualFactory<Handle = H>,
        L: PileListener + ?Sized,
    {
        let target = self.current_node_count();
        if target > self.nodes.len() {
            self.grow_to(target, origin, factory, listener);
        } else if target < self.nodes.len() {
            self.shrink_to(target, factory, listener);
        }
        self.evaluate(origin, factory);
    }

    /// Removes every node through the normal removal path. Controls are left
    /// untouched, so the next `update` grows the pile back.
    pub fn clear<F, L>(&mut self, factory: &mut F, listener: &mut L)
    where
        F: VisualFactory<Handle = H>,
        L: PileListener + ?Sized,
    {
        self.shrink_to(0, factory, listener);
    }

    fn grow_to<F, L>(&mut self, target: usize, origin: Vec2, factory: &mut F, listener: &mut L)
    where
        F: VisualFactory<Handle = H>,
        L: PileListener + ?Sized,
    {
        debug!("pile grow {} -> {target}", self.nodes.len());
        let layout = PileLayout::new(&self.config, &self.controls, target);
        while self.nodes.len() < target {
            let index = self.nodes.len();
            let mut node = PileNode {
                position: origin,
                offset: Vec2::ZERO,
                rotation: 0.0,
                visual: factory.create_visual(),
            };
            let transform = layout.place(index, origin, node.offset);
            node.apply(transform, factory);
            self.nodes.push(node);
            listener.node_added(index, &transform);
        }
    }

    fn shrink_to<F, L>(&mut self, target: usize, factory: &mut F, listener: &mut L)
    where
        F: VisualFactory<Handle = H>,
        L: PileListener + ?Sized,
    {
        if self.nodes.len() > target {
            debug!("pile shrink {} -> {target}", self.nodes.len());
        }
        while self.nodes.len() > target {
            let index = self.nodes.len() - 1;
            listener.node_removing(index, &self.nodes[index].transform());
            if let Some(node) = self.nodes.pop() {
                factory.destroy_visual(node.visual);
            }
            listener.node_removed(index);
        }
    }

    fn evaluate<F: VisualFactory<Handle = H>>(&mut self, origin: Vec2, factory: &mut F) {
        let layout = PileLayout::new(&self.config, &self.controls, self.nodes.len());
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let transform = layout.place(index, origin, node.offset);
            trace!(
                "node {index}: pos ({:.2}, {:.2}) rot {:.2}",
                transform.position.x,
                transform.position.y,
                transform.rotation
            );
            node.apply(transform, factory);
        }
    }

    pub fn snapshot(&self) -> PileSnapshot {
        PileSnapshot {
            config: self.config,
            controls: self.controls,
            nodes: self.transforms(),
        }
    }

    pub fn instances(&self) -> Vec<CardInstance> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| CardInstance::new(index, &node.transform()))
            .collect()
    }
}
