// Copyright (c) 2024 Mike Tsao

//! Control params and their scheduled automation events.

use crate::types::prelude::*;

/// One scheduled automation event on a control param. The anchor time is the
/// instant the event takes full effect; ramps additionally interpolate from
/// the previous event's anchor.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ParamEvent {
    SetValue {
        value: f64,
        time: Seconds,
    },
    LinearRamp {
        value: f64,
        end_time: Seconds,
    },
    ExponentialRamp {
        value: f64,
        end_time: Seconds,
    },
    Target {
        target: f64,
        start_time: Seconds,
        time_constant: f64,
    },
    Curve {
        values: Vec<f64>,
        start_time: Seconds,
        duration: Seconds,
    },
}
impl ParamEvent {
    fn anchor(&self) -> Seconds {
        match self {
            ParamEvent::SetValue { time, .. } => *time,
            ParamEvent::LinearRamp { end_time, .. } => *end_time,
            ParamEvent::ExponentialRamp { end_time, .. } => *end_time,
            ParamEvent::Target { start_time, .. } => *start_time,
            ParamEvent::Curve { start_time, .. } => *start_time,
        }
    }
}

/// One control param: a base value plus the scheduled events that override
/// it. Events are kept sorted by anchor time; equal anchors stay in
/// registration order.
#[derive(Debug, Default)]
pub(crate) struct ControlParam {
    pub(crate) value: f64,
    events: Vec<ParamEvent>,
}
impl ControlParam {
    pub(crate) fn new(value: f64) -> Self {
        Self {
            value,
            events: Vec::default(),
        }
    }

    pub(crate) fn push(&mut self, event: ParamEvent) {
        let anchor = event.anchor();
        let index = self.events.partition_point(|e| e.anchor() <= anchor);
        self.events.insert(index, event);
    }

    /// Removes all scheduled events at and after the given time.
    pub(crate) fn cancel(&mut self, time: Seconds) {
        self.events.retain(|e| e.anchor() < time);
    }

    /// The param's value at the given time: a piecewise walk over the sorted
    /// event list. This is a simplified rendition of how a real engine
    /// evaluates an automation timeline, but it honors set/ramp/target/curve
    /// shapes well enough for read-back and tests.
    pub(crate) fn value_at(&self, time: Seconds) -> f64 {
        let mut value = self.value;
        let mut prev_anchor = Seconds::ZERO;

        for (i, event) in self.events.iter().enumerate() {
            let anchor = event.anchor();
            match event {
                ParamEvent::SetValue { value: v, .. } => {
                    if time < anchor {
                        return value;
                    }
                    value = *v;
                }
                ParamEvent::LinearRamp { value: v, .. } => {
                    if time < anchor {
                        let span = (anchor - prev_anchor).0;
                        if span <= 0.0 {
                            return *v;
                        }
                        let percent = (time - prev_anchor).0 / span;
                        return value + (v - value) * percent.clamp(0.0, 1.0);
                    }
                    value = *v;
                }
                ParamEvent::ExponentialRamp { value: v, .. } => {
                    if time < anchor {
                        let span = (anchor - prev_anchor).0;
                        if span <= 0.0 || value == 0.0 || (value < 0.0) != (*v < 0.0) {
                            return *v;
                        }
                        let percent = ((time - prev_anchor).0 / span).clamp(0.0, 1.0);
                        return value * (v / value).powf(percent);
                    }
                    value = *v;
                }
                ParamEvent::Target {
                    target,
                    start_time,
                    time_constant,
                } => {
                    if time < anchor {
                        return value;
                    }
                    // The approach continues until the next event's anchor,
                    // or until `time` if this is the last event in range.
                    let until = self
                        .events
                        .get(i + 1)
                        .map(|next| next.anchor().0.min(time.0))
                        .unwrap_or(time.0);
                    let elapsed = until - start_time.0;
                    if *time_constant > 0.0 {
                        value = target + (value - target) * (-elapsed / time_constant).exp();
                    } else {
                        value = *target;
                    }
                }
                ParamEvent::Curve {
                    values,
                    start_time,
                    duration,
                } => {
                    if let Some(last) = values.last() {
                        if time < anchor {
                            return value;
                        }
                        let elapsed = (time - *start_time).0;
                        if elapsed >= duration.0 || values.len() == 1 {
                            value = *last;
                        } else {
                            let percent = elapsed / duration.0;
                            let index = (percent * (values.len() - 1) as f64).floor() as usize;
                            return values[index.min(values.len() - 1)];
                        }
                    }
                }
            }
            prev_anchor = anchor;
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use more_asserts::{assert_gt, assert_lt};

    #[test]
    fn set_value_takes_effect_at_its_time() {
        let mut p = ControlParam::new(440.0);
        p.push(ParamEvent::SetValue {
            value: 880.0,
            time: Seconds(1.0),
        });

        assert_eq!(p.value_at(Seconds(0.5)), 440.0);
        assert_eq!(p.value_at(Seconds(1.0)), 880.0);
        assert_eq!(p.value_at(Seconds(2.0)), 880.0);
    }

    #[test]
    fn linear_ramp_interpolates_from_previous_event() {
        let mut p = ControlParam::new(0.0);
        p.push(ParamEvent::SetValue {
            value: 1.0,
            time: Seconds(1.0),
        });
        p.push(ParamEvent::LinearRamp {
            value: 3.0,
            end_time: Seconds(3.0),
        });

        assert_eq!(p.value_at(Seconds(1.0)), 1.0);
        assert!(approx_eq!(f64, p.value_at(Seconds(2.0)), 2.0));
        assert_eq!(p.value_at(Seconds(3.0)), 3.0);
        assert_eq!(p.value_at(Seconds(4.0)), 3.0);
    }

    #[test]
    fn events_with_equal_anchor_fire_in_registration_order() {
        let mut p = ControlParam::new(0.0);
        p.push(ParamEvent::SetValue {
            value: 1.0,
            time: Seconds(1.0),
        });
        p.push(ParamEvent::SetValue {
            value: 2.0,
            time: Seconds(1.0),
        });

        assert_eq!(p.value_at(Seconds(1.0)), 2.0, "last write wins");
    }

    #[test]
    fn cancel_removes_at_and_after() {
        let mut p = ControlParam::new(0.0);
        p.push(ParamEvent::SetValue {
            value: 1.0,
            time: Seconds(1.0),
        });
        p.push(ParamEvent::SetValue {
            value: 2.0,
            time: Seconds(2.0),
        });
        p.cancel(Seconds(2.0));

        assert_eq!(p.value_at(Seconds(10.0)), 1.0);

        p.cancel(Seconds(0.0));
        assert_eq!(p.value_at(Seconds(10.0)), 0.0, "base value survives cancel");
    }

    #[test]
    fn target_approaches_asymptotically() {
        let mut p = ControlParam::new(1.0);
        p.push(ParamEvent::Target {
            target: 0.0,
            start_time: Seconds(0.0),
            time_constant: 0.5,
        });

        let v = p.value_at(Seconds(0.5));
        assert_gt!(v, 0.0);
        assert_lt!(v, 1.0);
        assert_lt!(p.value_at(Seconds(10.0)), 1e-6);
    }

    #[test]
    fn curve_steps_through_values() {
        let mut p = ControlParam::new(0.0);
        p.push(ParamEvent::Curve {
            values: vec![0.0, 0.5, 1.0],
            start_time: Seconds(1.0),
            duration: Seconds(1.0),
        });

        assert_eq!(p.value_at(Seconds(0.5)), 0.0);
        assert_eq!(p.value_at(Seconds(1.6)), 0.5);
        assert_eq!(p.value_at(Seconds(2.5)), 1.0);
    }
}
