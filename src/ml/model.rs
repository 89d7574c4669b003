// ============================================================
// Layer 5 — RandWire Network
// ============================================================
// Architecture (C = model.channel, N = batch):
//
//   [input maxpool 3×3/2]          optional
//   conv1  sep 3×3/2 → C/2, BN
//   conv2  ReLU, sep 3×3/2 → C, BN
//   dag3   graph0, C  → 2C, /2
//   dag4   graph1, 2C → 4C, /2
//   dag5   graph2, 4C → 8C, /2
//   ReLU, sep 1×1 → 1280, BN
//   global average pool → [N, 1280]
//   linear → classes, log-softmax
//
// Reference: Xie et al. (2019) Randomly Wired Neural Networks
//            Burn Book §3 (Building Blocks)

use anyhow::{bail, Context, Result};
use burn::{
    nn::{
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{log_softmax, relu},
};

use crate::domain::graph::Graph;
use crate::ml::layers::{DagLayer, SeparableConv2d};
use crate::ml::validator::Classifier;

/// Width of the feature vector fed to the classifier head.
pub const LAST_CHANNELS: usize = 1280;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct RandWireConfig {
    /// Image channels: 1 for MNIST, 3 for CIFAR10 / ImageNet
    pub in_channels: usize,
    /// Base width C; the three DAG stages output 2C, 4C, 8C
    pub channel:     usize,
    pub classes:     usize,
    #[config(default = false)]
    pub input_maxpool: bool,
}

impl RandWireConfig {
    /// Build the network around the three stage graphs.
    pub fn init<B: Backend>(&self, graphs: &[Graph], device: &B::Device) -> Result<RandWire<B>> {
        let [g0, g1, g2] = graphs else {
            bail!("RandWire needs exactly 3 graphs, got {}", graphs.len());
        };
        if self.channel < 2 {
            bail!("model.channel must be at least 2, got {}", self.channel);
        }
        if self.classes == 0 {
            bail!("model.classes must be positive");
        }
        let c = self.channel;

        let input_pool = self.input_maxpool.then(|| {
            MaxPool2dConfig::new([3, 3])
                .with_strides([2, 2])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init()
        });

        Ok(RandWire {
            input_pool,
            conv1:     SeparableConv2d::new(self.in_channels, c / 2, 3, 2, 1, device),
            bn1:       BatchNormConfig::new(c / 2).init(device),
            conv2:     SeparableConv2d::new(c / 2, c, 3, 2, 1, device),
            bn2:       BatchNormConfig::new(c).init(device),
            dag3:      DagLayer::new(c,     2 * c, g0.topology()?, device),
            dag4:      DagLayer::new(2 * c, 4 * c, g1.topology()?, device),
            dag5:      DagLayer::new(4 * c, 8 * c, g2.topology()?, device),
            conv_last: SeparableConv2d::new(8 * c, LAST_CHANNELS, 1, 1, 0, device),
            bn_last:   BatchNormConfig::new(LAST_CHANNELS).init(device),
            pool:      AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            fc:        LinearConfig::new(LAST_CHANNELS, self.classes).init(device),
        })
    }
}

#[derive(Module, Debug)]
pub struct RandWire<B: Backend> {
    pub input_pool: Option<MaxPool2d>,
    pub conv1:      SeparableConv2d<B>,
    pub bn1:        BatchNorm<B, 2>,
    pub conv2:      SeparableConv2d<B>,
    pub bn2:        BatchNorm<B, 2>,
    pub dag3:       DagLayer<B>,
    pub dag4:       DagLayer<B>,
    pub dag5:       DagLayer<B>,
    pub conv_last:  SeparableConv2d<B>,
    pub bn_last:    BatchNorm<B, 2>,
    pub pool:       AdaptiveAvgPool2d,
    pub fc:         Linear<B>,
}

impl<B: Backend> RandWire<B> {
    /// images: [batch, channels, height, width] → log-probabilities [batch, classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut y = images;
        if let Some(pool) = &self.input_pool {
            y = pool.forward(y);
        }

        // No ReLU before conv1: the stem starts directly on pixels.
        let y = self.bn1.forward(self.conv1.forward(y));
        let y = self.bn2.forward(self.conv2.forward(relu(y)));

        let y = self.dag3.forward(y);
        let y = self.dag4.forward(y);
        let y = self.dag5.forward(y);

        let y = self.bn_last.forward(self.conv_last.forward(relu(y)));
        let y = self.pool.forward(y);            // [batch, 1280, 1, 1]
        let y = y.flatten::<2>(1, 3);            // [batch, 1280]

        log_softmax(self.fc.forward(y), 1)
    }
}

impl<B: Backend> RandWire<B> {
    /// Check that the saved stages were built from the same graphs.
    pub fn check_record(&self, record: &RandWireRecord<B>) -> Result<()> {
        let stages = [
            ("dag3", &self.dag3, &record.dag3),
            ("dag4", &self.dag4, &record.dag4),
            ("dag5", &self.dag5, &record.dag5),
        ];
        for (name, stage, saved) in stages {
            stage.check_record(saved).with_context(|| format!("stage {name}"))?;
        }
        Ok(())
    }
}

impl<B: Backend> Classifier<B> for RandWire<B> {
    fn log_probs(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward(images)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    pub(crate) fn tiny_graphs() -> Vec<Graph> {
        vec![
            Graph::new(3, vec![(0, 1), (0, 2), (1, 2)]),
            Graph::new(4, vec![(0, 2), (1, 2), (2, 3)]),
            Graph::new(2, vec![(0, 1)]),
        ]
    }

    pub(crate) fn tiny_config(in_channels: usize) -> RandWireConfig {
        RandWireConfig::new(in_channels, 4, 10)
    }

    #[test]
    fn test_forward_gives_log_probabilities() {
        let device = Default::default();
        let model: RandWire<TestBackend> = tiny_config(1).init(&tiny_graphs(), &device).unwrap();

        let images = Tensor::random([3, 1, 28, 28], Distribution::Default, &device);
        let out = model.forward(images);
        assert_eq!(out.dims(), [3, 10]);

        let row_sums: Vec<f32> = out.exp().sum_dim(1).into_data().to_vec().unwrap();
        for s in row_sums {
            assert!((s - 1.0).abs() < 1e-4, "row sum {s}");
        }
    }

    #[test]
    fn test_input_maxpool_on_rgb() {
        let device = Default::default();
        let model: RandWire<TestBackend> = tiny_config(3)
            .with_input_maxpool(true)
            .init(&tiny_graphs(), &device)
            .unwrap();
        assert!(model.input_pool.is_some());

        let images = Tensor::random([2, 3, 32, 32], Distribution::Default, &device);
        assert_eq!(model.log_probs(images).dims(), [2, 10]);
    }

    #[test]
    fn test_stage_widths_follow_base_channel() {
        let device = Default::default();
        let model: RandWire<TestBackend> = tiny_config(1).init(&tiny_graphs(), &device).unwrap();
        assert_eq!(model.dag3.nodes.len(), 3);
        assert_eq!(model.dag4.nodes.len(), 4);
        assert_eq!(model.dag5.nodes.len(), 2);
        // base channel 4 → last DAG stage outputs 32 channels
        assert_eq!(model.dag5.nodes[1].bn.gamma.val().dims(), [32]);
    }

    #[test]
    fn test_wrong_graph_count_or_sizes_rejected() {
        let device = Default::default();
        let graphs = tiny_graphs();
        assert!(tiny_config(1).init::<TestBackend>(&graphs[..2], &device).is_err());
        assert!(RandWireConfig::new(1, 1, 10).init::<TestBackend>(&graphs, &device).is_err());
        assert!(RandWireConfig::new(1, 4, 0).init::<TestBackend>(&graphs, &device).is_err());
    }

    #[test]
    fn test_cyclic_graph_rejected() {
        let device = Default::default();
        let mut graphs = tiny_graphs();
        graphs[1] = Graph::new(2, vec![(0, 1), (1, 0)]);
        assert!(tiny_config(1).init::<TestBackend>(&graphs, &device).is_err());
    }
}
