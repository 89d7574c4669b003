// ============================================================
// Layer 5 — RandWire Building Blocks
// ============================================================
// Three modules make up every randomly wired stage:
//
//   SeparableConv2d  depthwise k×k conv (one filter per channel)
//                    followed by a 1×1 pointwise conv
//
//   NodeOp           one graph node:
//                      weighted sum of inputs (sigmoid weights)
//                      → ReLU → SeparableConv2d 3×3 → BatchNorm
//
//   DagLayer         a whole graph of NodeOps. Input nodes read
//                    the stage input with stride 2, inner nodes
//                    read their predecessors with stride 1, and
//                    the stage output is the mean of the sinks.
//
// BatchNorm picks running statistics by itself when the backend
// has no autodiff, so nothing here needs an explicit eval flag.
//
// Reference: Xie et al. (2019) Randomly Wired Neural Networks
//            Chollet (2017) Xception (separable convolutions)
//            Burn Book §3 (Building Blocks)

use anyhow::{bail, Result};
use burn::{
    module::{Ignored, Param},
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{relu, sigmoid},
};

use crate::domain::graph::DagTopology;

// ─── SeparableConv2d ──────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct SeparableConv2d<B: Backend> {
    pub depthwise: Conv2d<B>,
    pub pointwise: Conv2d<B>,
}

impl<B: Backend> SeparableConv2d<B> {
    pub fn new(
        in_channels:  usize,
        out_channels: usize,
        kernel:       usize,
        stride:       usize,
        padding:      usize,
        device:       &B::Device,
    ) -> Self {
        let depthwise = Conv2dConfig::new([in_channels, in_channels], [kernel, kernel])
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Explicit(padding, padding))
            .with_groups(in_channels)
            .with_bias(false)
            .init(device);
        let pointwise = Conv2dConfig::new([in_channels, out_channels], [1, 1])
            .with_bias(false)
            .init(device);
        Self { depthwise, pointwise }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.pointwise.forward(self.depthwise.forward(x))
    }
}

// ─── NodeOp ───────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct NodeOp<B: Backend> {
    /// Aggregation weights, one per incoming edge.
    /// Absent for single-input nodes.
    pub agg_weight: Option<Param<Tensor<B, 1>>>,
    pub conv:       SeparableConv2d<B>,
    pub bn:         BatchNorm<B, 2>,
}

impl<B: Backend> NodeOp<B> {
    pub fn new(
        in_degree:    usize,
        in_channels:  usize,
        out_channels: usize,
        stride:       usize,
        device:       &B::Device,
    ) -> Self {
        let agg_weight = (in_degree > 1)
            .then(|| Param::from_tensor(Tensor::zeros([in_degree], device)));
        Self {
            agg_weight,
            conv: SeparableConv2d::new(in_channels, out_channels, 3, stride, 1, device),
            bn:   BatchNormConfig::new(out_channels).init(device),
        }
    }

    /// `inputs` holds one tensor per incoming edge, all [B, C, H, W].
    pub fn forward(&self, inputs: &[Tensor<B, 4>]) -> Tensor<B, 4> {
        let y = match &self.agg_weight {
            Some(weight) => {
                let w = sigmoid(weight.val());
                let mut acc = inputs[0].clone() * w.clone().slice([0..1]).reshape([1, 1, 1, 1]);
                for (i, x) in inputs.iter().enumerate().skip(1) {
                    acc = acc + x.clone() * w.clone().slice([i..i + 1]).reshape([1, 1, 1, 1]);
                }
                acc
            }
            None => inputs[0].clone(),
        };
        self.bn.forward(self.conv.forward(relu(y)))
    }
}

// ─── DagLayer ─────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct DagLayer<B: Backend> {
    pub nodes:    Vec<NodeOp<B>>,
    pub topology: Ignored<DagTopology>,
}

impl<B: Backend> DagLayer<B> {
    pub fn new(
        in_channels:  usize,
        out_channels: usize,
        topology:     DagTopology,
        device:       &B::Device,
    ) -> Self {
        let nodes = (0..topology.num_nodes)
            .map(|v| {
                let (channels, stride) = if topology.is_input(v) {
                    (in_channels, 2)
                } else {
                    (out_channels, 1)
                };
                NodeOp::new(topology.in_degree[v].max(1), channels, out_channels, stride, device)
            })
            .collect();
        Self { nodes, topology: Ignored(topology) }
    }

    /// Check that `record` was saved from a stage with the same node
    /// count and the same single/multi-input nodes. Tensor shapes are
    /// compared by the checkpoint loader.
    pub fn check_record(&self, record: &DagLayerRecord<B>) -> Result<()> {
        if record.nodes.len() != self.nodes.len() {
            bail!("graph has {} nodes, checkpoint has {}", self.nodes.len(), record.nodes.len());
        }
        for (v, (node, saved)) in self.nodes.iter().zip(&record.nodes).enumerate() {
            if node.agg_weight.is_some() != saved.agg_weight.is_some() {
                bail!(
                    "node {v}: aggregation weights in graph = {}, in checkpoint = {}",
                    node.agg_weight.is_some(),
                    saved.agg_weight.is_some(),
                );
            }
        }
        Ok(())
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let topo = &self.topology.0;
        let mut outputs: Vec<Option<Tensor<B, 4>>> = vec![None; topo.num_nodes];

        for &node in &topo.order {
            let out = if topo.is_input(node) {
                self.nodes[node].forward(&[x.clone()])
            } else {
                // Topological order guarantees every predecessor is filled.
                let inputs: Vec<Tensor<B, 4>> = topo.predecessors[node]
                    .iter()
                    .filter_map(|&p| outputs[p].clone())
                    .collect();
                self.nodes[node].forward(&inputs)
            };
            outputs[node] = Some(out);
        }

        let sinks: Vec<Tensor<B, 4>> = topo
            .output_nodes
            .iter()
            .filter_map(|&v| outputs[v].take())
            .collect();
        Tensor::stack::<5>(sinks, 0).mean_dim(0).squeeze::<4>(0)
    }
}
