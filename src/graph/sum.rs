// Copyright (c) 2024 Mike Tsao

use crate::engine::{ConnectTarget, RenderContext};
use crate::ugen::Input;

/// Fans a set of inputs into one target. Scalar inputs are folded into a
/// single shared constant-offset source rather than one node each; ugens and
/// params connect through their own linkage records, so instrument teardown
/// still finds every edge.
pub(crate) fn fan_into(ctx: &mut RenderContext, inputs: &[Input], to: ConnectTarget) {
    let mut constant_sum: Option<f64> = None;
    for input in inputs {
        match input {
            Input::Scalar(v) => *constant_sum.get_or_insert(0.0) += v,
            Input::Ugen(u) => u.connect(ctx, to),
            Input::Param(p) => p.connect(ctx, to),
        }
    }
    if let Some(total) = constant_sum {
        let dc = ctx.dc(total);
        ctx.connect(dc, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::Param;

    #[test]
    fn scalars_fold_into_one_constant_source() {
        let mut ctx = RenderContext::new();
        let gain = ctx.create_gain();
        fan_into(
            &mut ctx,
            &[Input::Scalar(2.0), Input::Scalar(3.0)],
            gain.node.into(),
        );

        let inputs = ctx.inputs_of(gain.node.into());
        assert_eq!(inputs.len(), 1, "constants should coalesce into one source");
        assert_eq!(inputs[0], ctx.dc(5.0));
    }

    #[test]
    fn no_constant_source_without_scalar_inputs() {
        let mut ctx = RenderContext::new();
        let gain = ctx.create_gain();
        fan_into(&mut ctx, &[], gain.node.into());
        assert!(ctx.inputs_of(gain.node.into()).is_empty());
    }

    #[test]
    fn params_reach_the_target_through_their_bridge() {
        let mut ctx = RenderContext::new();
        let gain = ctx.create_gain();
        let p = Param::new("freq", 440.0).unwrap();
        fan_into(&mut ctx, &[Input::Param(p.clone())], gain.node.into());
        assert_eq!(
            ctx.inputs_of(gain.node.into()).len(),
            1,
            "a param input should fan in through its synthesized source"
        );
    }
}
