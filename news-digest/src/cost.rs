use crate::types::TokenUsage;
use tracing::info;

/// USD per 1000 tokens for a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

const DEFAULT_MODEL: &str = "gpt-4";

const PRICING: &[(&str, ModelPricing)] = &[
    ("gpt-4", ModelPricing { input_per_1k: 0.03, output_per_1k: 0.06 }),
    ("gpt-4-turbo", ModelPricing { input_per_1k: 0.01, output_per_1k: 0.03 }),
    ("gpt-4o", ModelPricing { input_per_1k: 0.005, output_per_1k: 0.015 }),
    ("gpt-4o-mini", ModelPricing { input_per_1k: 0.00015, output_per_1k: 0.0006 }),
    ("gpt-3.5-turbo", ModelPricing { input_per_1k: 0.0015, output_per_1k: 0.002 }),
];

/// Price table entry for `model`, falling back to the gpt-4 entry for unknown models.
pub fn pricing_for(model: &str) -> ModelPricing {
    let lookup = |name: &str| PRICING.iter().find(|(m, _)| *m == name).map(|(_, p)| *p);
    lookup(model)
        .or_else(|| lookup(DEFAULT_MODEL))
        .unwrap_or(ModelPricing { input_per_1k: 0.0, output_per_1k: 0.0 })
}

/// Rough cost estimate in USD. Informational only.
pub fn estimate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    let pricing = pricing_for(model);
    (input_tokens as f64 / 1000.0) * pricing.input_per_1k
        + (output_tokens as f64 / 1000.0) * pricing.output_per_1k
}

/// Token and cost totals for a single run.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    requests: u32,
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
    cost_usd: f64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one completion's usage and return its estimated cost.
    pub fn record(&mut self, model: &str, usage: &TokenUsage) -> f64 {
        let cost = estimate_cost(model, usage.prompt_tokens, usage.completion_tokens);
        self.requests += 1;
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.total_tokens;
        self.cost_usd += cost;
        cost
    }

    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens
    }

    pub fn completion_tokens(&self) -> u64 {
        self.completion_tokens
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn cost_usd(&self) -> f64 {
        self.cost_usd
    }

    pub fn log_summary(&self) {
        info!("Usage summary:");
        info!("  requests: {}", self.requests);
        info!(
            "  tokens: {} ({} prompt, {} completion)",
            self.total_tokens, self.prompt_tokens, self.completion_tokens
        );
        info!("  estimated cost: ${:.4}", self.cost_usd);
    }
}
