//! Optimization pass manager (spec.md §4.E)
//!
//! A [`Pass`] is a single trait with every hook optional (default no-ops),
//! mirroring spec.md's "(name, optional init, optional deinit, optional
//! run_on_module, optional run_on_function)" shape rather than splitting
//! module/function passes into separate traits. The manager keeps two
//! ordered lists — which hook actually fires is a registration-time choice,
//! not a type-level one.

use crate::error::PassError;
use crate::ir::{Function, Module};
use anvil_core::{DiagnosticSink, StderrSink};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationLevel {
    None,
    Debug,
    Default,
    Size,
    Speed,
}

#[derive(Debug, Clone)]
pub struct PassManagerConfig {
    pub optimization_level: OptimizationLevel,
    /// 0 favors size, 100 favors speed; passes may consult this to bias
    /// their own heuristics (e.g. inlining thresholds, not implemented by
    /// the two passes shipped here).
    pub size_speed_tradeoff: u8,
    pub verbose: bool,
    pub collect_statistics: bool,
}

impl Default for PassManagerConfig {
    fn default() -> Self {
        PassManagerConfig {
            optimization_level: OptimizationLevel::Default,
            size_speed_tradeoff: 50,
            verbose: false,
            collect_statistics: true,
        }
    }
}

impl PassManagerConfig {
    pub fn with_optimization_level(mut self, level: OptimizationLevel) -> Self {
        self.optimization_level = level;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_size_speed_tradeoff(mut self, tradeoff: u8) -> Self {
        self.size_speed_tradeoff = tradeoff.min(100);
        self
    }
}

/// Accumulated statistics for one pass, keyed by pass name in the manager.
#[derive(Debug, Clone, Default)]
pub struct PassStats {
    pub transformations_counted: u64,
    pub total_ns: u64,
    pub invocations: u64,
    pub counters: HashMap<String, u64>,
}

/// A single optimization or analysis pass. Every hook defaults to a no-op
/// so implementors only override what they need (spec.md §4.E).
pub trait Pass {
    fn name(&self) -> &str;

    fn init(&mut self, _manager: &PassManager) {}
    fn deinit(&mut self) {}

    fn run_on_module(&mut self, _module: &mut Module) -> Result<bool, PassError> {
        Ok(false)
    }

    fn run_on_function(&mut self, _function: &mut Function) -> Result<bool, PassError> {
        Ok(false)
    }

    /// Lets a pass report numeric counters (e.g. DCE's `removed_blocks`)
    /// into the manager's per-pass statistics after a run.
    fn take_counters(&mut self) -> HashMap<String, u64> {
        HashMap::new()
    }
}

pub struct PassManager {
    config: PassManagerConfig,
    sink: Arc<dyn DiagnosticSink>,
    module_passes: Vec<Box<dyn Pass>>,
    function_passes: Vec<Box<dyn Pass>>,
    stats: HashMap<String, PassStats>,
}

impl PassManager {
    pub fn new(config: PassManagerConfig) -> Self {
        PassManager {
            config,
            sink: Arc::new(StderrSink::default()),
            module_passes: Vec::new(),
            function_passes: Vec::new(),
            stats: HashMap::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &PassManagerConfig {
        &self.config
    }

    pub fn add_module_pass(&mut self, mut pass: Box<dyn Pass>) {
        pass.init(self);
        self.module_passes.push(pass);
    }

    pub fn add_function_pass(&mut self, mut pass: Box<dyn Pass>) {
        pass.init(self);
        self.function_passes.push(pass);
    }

    fn log(&self, message: &str) {
        if self.config.verbose {
            self.sink.emit(message);
        }
    }

    fn record(&mut self, name: &str, duration_ns: u64, changed: bool, counters: HashMap<String, u64>) {
        if !self.config.collect_statistics {
            return;
        }
        let entry = self.stats.entry(name.to_string()).or_default();
        entry.invocations += 1;
        entry.total_ns += duration_ns;
        if changed {
            entry.transformations_counted += 1;
        }
        for (key, value) in counters {
            *entry.counters.entry(key).or_insert(0) += value;
        }
    }

    /// Runs every module pass, then every function pass over every function
    /// in source order, per spec.md §4.E's execution algorithm. A failing
    /// pass never halts the run; its error is collected and reported
    /// alongside the accumulated `modified` flag.
    pub fn run(&mut self, module: &mut Module) -> (bool, Vec<PassError>) {
        let mut modified = false;
        let mut errors = Vec::new();

        for index in 0..self.module_passes.len() {
            let name = self.module_passes[index].name().to_string();
            self.log(&format!("Running module pass {name}"));
            let start = Instant::now();
            let result = self.module_passes[index].run_on_module(module);
            let elapsed = start.elapsed().as_nanos() as u64;
            let counters = self.module_passes[index].take_counters();
            match result {
                Ok(changed) => {
                    modified |= changed;
                    self.record(&name, elapsed, changed, counters);
                }
                Err(err) => {
                    self.record(&name, elapsed, false, counters);
                    errors.push(err);
                }
            }
        }

        for function in module.functions_mut() {
            for index in 0..self.function_passes.len() {
                let name = self.function_passes[index].name().to_string();
                self.log(&format!("Running function pass {name}"));
                let start = Instant::now();
                let result = self.function_passes[index].run_on_function(function);
                let elapsed = start.elapsed().as_nanos() as u64;
                let counters = self.function_passes[index].take_counters();
                match result {
                    Ok(changed) => {
                        modified |= changed;
                        self.record(&name, elapsed, changed, counters);
                    }
                    Err(err) => {
                        self.record(&name, elapsed, false, counters);
                        errors.push(err);
                    }
                }
            }
        }

        (modified, errors)
    }

    pub fn get_stat(&self, pass: &str, key: &str) -> Option<u64> {
        self.stats.get(pass)?.counters.get(key).copied()
    }

    pub fn stats_snapshot(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, stats) in &self.stats {
            map.insert(
                name.clone(),
                serde_json::json!({
                    "transformations_counted": stats.transformations_counted,
                    "total_ns": stats.total_ns,
                    "invocations": stats.invocations,
                    "counters": stats.counters,
                }),
            );
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PassError;
    use crate::ir::Module;

    struct AlwaysChanges;

    impl Pass for AlwaysChanges {
        fn name(&self) -> &str {
            "always-changes"
        }

        fn run_on_module(&mut self, _module: &mut Module) -> Result<bool, PassError> {
            Ok(true)
        }
    }

    struct AlwaysFails;

    impl Pass for AlwaysFails {
        fn name(&self) -> &str {
            "always-fails"
        }

        fn run_on_module(&mut self, _module: &mut Module) -> Result<bool, PassError> {
            Err(PassError::new("always-fails", "deliberate test failure"))
        }
    }

    #[test]
    fn run_accumulates_modified_across_module_passes() {
        let mut manager = PassManager::new(PassManagerConfig::default());
        manager.add_module_pass(Box::new(AlwaysChanges));
        let mut module = Module::new("m");
        let (modified, errors) = manager.run(&mut module);
        assert!(modified);
        assert!(errors.is_empty());
        assert_eq!(manager.get_stat("always-changes", "missing"), None);
    }

    #[test]
    fn a_failing_pass_does_not_halt_the_manager() {
        let mut manager = PassManager::new(PassManagerConfig::default());
        manager.add_module_pass(Box::new(AlwaysFails));
        manager.add_module_pass(Box::new(AlwaysChanges));
        let mut module = Module::new("m");
        let (modified, errors) = manager.run(&mut module);
        assert!(modified);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn size_speed_tradeoff_is_clamped_to_100() {
        let config = PassManagerConfig::default().with_size_speed_tradeoff(250);
        assert_eq!(config.size_speed_tradeoff, 100);
    }
}
