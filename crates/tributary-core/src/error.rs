//! Error types for the Tributary attribution engine.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("empty amount")] EmptyAmount,
    #[error("invalid amount: {0}")] InvalidAmount(String),
    #[error("amount out of range: {0}")] AmountOutOfRange(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixedError {
    #[error("empty factor")] EmptyFactor,
    #[error("invalid factor: {0}")] InvalidFactor(String),
    #[error("factor out of range: {0}")] FactorOutOfRange(String),
    #[error("too many fractional digits: {digits} > 9 in {value}")] TooManyFractionalDigits { value: String, digits: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("empty node id")] EmptyNodeId,
    #[error("empty creator id for node {0}")] EmptyCreatorId(String),
    #[error("propagation rate {rate_ppb} out of range for node {node_id}")] PropagationRateOutOfRange { node_id: String, rate_ppb: u64 },
    #[error("duplicate node id: {0}")] DuplicateNodeId(String),
    #[error("edge endpoint not found: {0}")] UnknownEndpoint(String),
    #[error("self-loop edge on node {0}")] SelfLoop(String),
    #[error("edge {from_id} -> {to_id} has zero weight")] ZeroEdgeWeight { from_id: String, to_id: String },
    #[error("node not found: {0}")] NodeNotFound(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeightError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max retention multiplier must be > 0")] ZeroRetentionMultiplier,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistributionError {
    #[error(transparent)] Graph(#[from] GraphError),
    #[error(transparent)] Weight(#[from] WeightError),
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug)]
pub enum TributaryError {
    #[error(transparent)] Money(#[from] MoneyError),
    #[error(transparent)] Fixed(#[from] FixedError),
    #[error(transparent)] Graph(#[from] GraphError),
    #[error(transparent)] Weight(#[from] WeightError),
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Distribution(#[from] DistributionError),
}
