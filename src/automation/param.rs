// Copyright (c) 2024 Mike Tsao

use crate::engine::{ConnectTarget, GainNode, RenderContext};
use crate::types::prelude::*;
use crate::ugen::key;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct ParamCore {
    name: String,
    // The last explicitly set scalar, used to seed targets bound later.
    value: f64,
    bound_params: Vec<ParamUid>,
    bound_targets: Vec<ConnectTarget>,
    signal: Option<GainNode>,
}

/// A logical scalar control value that can drive many heterogeneous
/// downstream targets at once. Control-capable targets bind directly;
/// signal-rate targets share one lazily created synthesized source, a gain
/// stage fed by the constant-offset source. Every automation call replays
/// identically across all bound targets, so the two kinds stay in lockstep.
///
/// Handles are cheap clones sharing one core.
#[derive(Clone, Debug)]
pub struct Param(Arc<RwLock<ParamCore>>);
impl Param {
    /// Creates a param, failing with [Error::ParamName] if the name is not a
    /// well-formed identifier.
    pub fn new(name: &str, default: f64) -> Result<Self> {
        if !key::is_identifier(name) {
            return Err(Error::ParamName(name.to_string()));
        }
        Ok(Self(Arc::new(RwLock::new(ParamCore {
            name: name.to_string(),
            value: finite(default)?,
            bound_params: Vec::default(),
            bound_targets: Vec::default(),
            signal: None,
        }))))
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> String {
        self.0.read().unwrap().name.clone()
    }

    /// Binds a new downstream target exactly once; repeat calls with an
    /// already-bound target are no-ops. A control-capable target binds
    /// directly and is seeded with the current value at time 0. Any other
    /// target is fed from the shared synthesized source.
    pub fn connect(&self, ctx: &mut RenderContext, target: ConnectTarget) {
        let mut core = self.0.write().unwrap();
        if core.bound_targets.contains(&target) {
            return;
        }
        core.bound_targets.push(target);
        match target {
            ConnectTarget::Param(param) => {
                core.bound_params.push(param);
                ctx.set_value_at_time(param, core.value, Seconds::ZERO);
            }
            ConnectTarget::Node(_) | ConnectTarget::Destination => {
                let signal = if let Some(signal) = core.signal {
                    signal
                } else {
                    let signal = ctx.create_gain_with(core.value);
                    let one = ctx.dc(1.0);
                    ctx.connect(one, signal.node.into());
                    core.signal = Some(signal);
                    core.bound_params.push(signal.gain);
                    signal
                };
                ctx.connect(signal.node, target);
            }
        }
    }

    /// Sets the value at the current time.
    pub fn set(&self, ctx: &mut RenderContext, value: f64) -> Result<()> {
        let now = ctx.current_time();
        self.set_at(ctx, value, now)
    }

    /// Sets the value at the given time.
    pub fn set_at(&self, ctx: &mut RenderContext, value: f64, time: Seconds) -> Result<()> {
        let value = finite(value)?;
        let time = Seconds(finite(time.0)?);
        let mut core = self.0.write().unwrap();
        core.value = value;
        for param in &core.bound_params {
            ctx.set_value_at_time(*param, value, time);
        }
        Ok(())
    }

    /// Ramps linearly to the value, ending at the given time.
    pub fn lin_to(&self, ctx: &mut RenderContext, value: f64, end_time: Seconds) -> Result<()> {
        let value = finite(value)?;
        let end_time = Seconds(finite(end_time.0)?);
        for param in &self.0.read().unwrap().bound_params {
            ctx.linear_ramp_to_value_at_time(*param, value, end_time);
        }
        Ok(())
    }

    /// Ramps exponentially to the value, ending at the given time.
    pub fn exp_to(&self, ctx: &mut RenderContext, value: f64, end_time: Seconds) -> Result<()> {
        let value = finite(value)?;
        let end_time = Seconds(finite(end_time.0)?);
        for param in &self.0.read().unwrap().bound_params {
            ctx.exponential_ramp_to_value_at_time(*param, value, end_time);
        }
        Ok(())
    }

    /// Approaches the value exponentially from the given start time with the
    /// given time constant.
    pub fn target_at(
        &self,
        ctx: &mut RenderContext,
        value: f64,
        start_time: Seconds,
        time_constant: f64,
    ) -> Result<()> {
        let value = finite(value)?;
        let start_time = Seconds(finite(start_time.0)?);
        let time_constant = finite(time_constant)?;
        for param in &self.0.read().unwrap().bound_params {
            ctx.set_target_at_time(*param, value, start_time, time_constant);
        }
        Ok(())
    }

    /// Steps through the given values over the given duration.
    pub fn curve_at(
        &self,
        ctx: &mut RenderContext,
        values: &[f64],
        start_time: Seconds,
        duration: Seconds,
    ) -> Result<()> {
        for v in values {
            finite(*v)?;
        }
        let start_time = Seconds(finite(start_time.0)?);
        let duration = Seconds(finite(duration.0)?);
        for param in &self.0.read().unwrap().bound_params {
            ctx.set_value_curve_at_time(*param, values.to_vec(), start_time, duration);
        }
        Ok(())
    }

    /// Removes all scheduled automation at and after the given time from
    /// every bound target.
    pub fn cancel(&self, ctx: &mut RenderContext, time: Seconds) -> Result<()> {
        let time = Seconds(finite(time.0)?);
        for param in &self.0.read().unwrap().bound_params {
            ctx.cancel_scheduled_values(*param, time);
        }
        Ok(())
    }

    /// The first bound target's live value, or 0 if nothing is bound yet.
    /// This is what lets a param be read like a plain number in expressions.
    pub fn value_of(&self, ctx: &RenderContext) -> f64 {
        self.0
            .read()
            .unwrap()
            .bound_params
            .first()
            .map_or(0.0, |param| ctx.param_value(*param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn rejects_malformed_names() {
        assert!(matches!(Param::new("0", 1.0), Err(Error::ParamName(_))));
        assert!(matches!(Param::new("a.b", 1.0), Err(Error::ParamName(_))));
        assert!(Param::new("freq", 440.0).is_ok());
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut ctx = RenderContext::new();
        let p = Param::new("freq", 440.0).unwrap();
        assert!(matches!(
            p.set(&mut ctx, f64::NAN),
            Err(Error::Value(_))
        ));
        assert!(matches!(
            p.lin_to(&mut ctx, f64::INFINITY, Seconds(1.0)),
            Err(Error::Value(_))
        ));
    }

    #[test]
    fn connect_binds_each_target_exactly_once() {
        let mut ctx = RenderContext::new();
        let gain = ctx.create_gain();
        let p = Param::new("freq", 440.0).unwrap();

        p.connect(&mut ctx, ConnectTarget::Param(gain.gain));
        p.connect(&mut ctx, ConnectTarget::Param(gain.gain));
        assert_eq!(p.0.read().unwrap().bound_params.len(), 1);
    }

    #[test]
    fn control_targets_are_seeded_at_time_zero() {
        let mut ctx = RenderContext::new();
        let gain = ctx.create_gain();
        let p = Param::new("freq", 440.0).unwrap();
        p.connect(&mut ctx, ConnectTarget::Param(gain.gain));
        assert!(approx_eq!(f64, ctx.param_value(gain.gain), 440.0));
    }

    #[test]
    fn signal_targets_share_one_synthesized_source() {
        let mut ctx = RenderContext::new();
        let a = ctx.create_node("filter");
        let b = ctx.create_node("filter");
        let p = Param::new("cutoff", 100.0).unwrap();
        p.connect(&mut ctx, a.into());
        p.connect(&mut ctx, b.into());

        let source_a = ctx.inputs_of(a.into());
        let source_b = ctx.inputs_of(b.into());
        assert_eq!(source_a, source_b, "both targets should share one source");
        assert_eq!(
            ctx.inputs_of(source_a[0].into()),
            vec![ctx.dc(1.0)],
            "the synthesized source is fed by the unit constant"
        );
    }

    #[test]
    fn set_replays_across_control_and_signal_targets() {
        let mut ctx = RenderContext::new();
        let gain = ctx.create_gain();
        let filter = ctx.create_node("filter");
        let p = Param::new("level", 0.5).unwrap();
        p.connect(&mut ctx, ConnectTarget::Param(gain.gain));
        p.connect(&mut ctx, filter.into());

        p.set(&mut ctx, 0.8).unwrap();
        let signal_gain = p.0.read().unwrap().bound_params[1];
        assert!(approx_eq!(f64, ctx.param_value(gain.gain), 0.8));
        assert!(approx_eq!(f64, ctx.param_value(signal_gain), 0.8));
        assert!(approx_eq!(f64, p.value_of(&ctx), 0.8));
    }

    #[test]
    fn value_of_is_zero_while_unbound() {
        let ctx = RenderContext::new();
        let p = Param::new("freq", 440.0).unwrap();
        assert_eq!(p.value_of(&ctx), 0.0);
    }
}
