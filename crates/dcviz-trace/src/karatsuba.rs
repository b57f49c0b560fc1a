//! Karatsuba multiplication over decimal digit vectors.
//!
//! Each call pads both operands to a common length `n`, splits off the `m = n/2`
//! low digits and makes three recursive calls (`z0` on the lows, `z2` on the
//! highs, `z1` on the digit sums) before combining
//! `z2·10^(2m) + (z1 − z0 − z2)·10^m + z0`.
//!
//! Arithmetic is `u128`. With at most [`DIGITS`]`.max` digits per operand every
//! intermediate stays below `10^26`.

use crate::digits::{add_digits, from_digits, pad_to, split_digits, to_digits};
use dcviz_core::{
    Algorithm, Bounds, FrameEffect, Highlights, Local, Locals, ReplayState, TraceAction,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Supported digit counts per operand.
pub const DIGITS: Bounds = Bounds::new(1, 12, 6);

/// Largest operand with `digits` decimal digits.
#[must_use]
pub fn max_operand(digits: usize) -> u128 {
    let d = u32::try_from(DIGITS.clamp(digits)).unwrap_or(u32::MAX);
    10u128.pow(d) - 1
}

/// Two operands bounded to a digit count.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KaratsubaInput {
    /// Left operand.
    pub x: u128,
    /// Right operand.
    pub y: u128,
    /// Configured digit count (already clamped).
    pub digits: usize,
}

impl KaratsubaInput {
    /// Clamp `digits` into [`DIGITS`] and both operands to `10^digits − 1`.
    #[must_use]
    pub fn new(x: u128, y: u128, digits: usize) -> Self {
        let digits = DIGITS.clamp(digits);
        let cap = max_operand(digits);
        Self {
            x: x.min(cap),
            y: y.min(cap),
            digits,
        }
    }

    /// Both operands as digit rows, zero-padded to `digits` (or the longer
    /// operand, if that is wider).
    #[must_use]
    pub fn digit_rows(&self) -> (Vec<u8>, Vec<u8>) {
        let (x, y) = (to_digits(self.x, self.digits), to_digits(self.y, self.digits));
        let n = x.len().max(y.len());
        (pad_to(&x, n), pad_to(&y, n))
    }
}

/// Which of the three sub-products a recursive call computes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    /// Product of the low halves.
    Z0,
    /// Product of the digit sums (before subtracting `z0 + z2`).
    Z1,
    /// Product of the high halves.
    Z2,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Z0 => "z0",
            Self::Z1 => "z1",
            Self::Z2 => "z2",
        })
    }
}

/// `u128` as a decimal string. Internally tagged enums buffer their fields,
/// and that buffer has no 128-bit integers.
mod decimal {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(v: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(v)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One observable event of a Karatsuba run.
///
/// Every `u128` payload is written as a decimal string.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum KaratsubaAction {
    /// Entered a call on `n`-digit operands `x` and `y`.
    Segment {
        n: usize,
        #[serde(with = "decimal")]
        x: u128,
        #[serde(with = "decimal")]
        y: u128,
    },
    /// Single-digit multiply; closes the call.
    Base {
        #[serde(with = "decimal")]
        x: u128,
        #[serde(with = "decimal")]
        y: u128,
        #[serde(with = "decimal")]
        product: u128,
    },
    /// Operands split into `n − m` high and `m` low digits.
    Split {
        m: usize,
        #[serde(with = "decimal")]
        x_high: u128,
        #[serde(with = "decimal")]
        x_low: u128,
        #[serde(with = "decimal")]
        y_high: u128,
        #[serde(with = "decimal")]
        y_low: u128,
    },
    /// About to compute one sub-product.
    Call { which: Term },
    /// A sub-product call returned `value`.
    AfterCall {
        which: Term,
        #[serde(with = "decimal")]
        value: u128,
    },
    /// The three sub-products are available.
    Combine {
        m: usize,
        #[serde(with = "decimal")]
        z0: u128,
        #[serde(with = "decimal")]
        z2: u128,
        #[serde(with = "decimal")]
        z1raw: u128,
    },
    /// The call finished with `value`.
    Result {
        #[serde(with = "decimal")]
        value: u128,
    },
}

impl TraceAction for KaratsubaAction {
    fn kind(&self) -> &'static str {
        match self {
            Self::Segment { .. } => "segment",
            Self::Base { .. } => "base",
            Self::Split { .. } => "split",
            Self::Call { .. } => "call",
            Self::AfterCall { .. } => "afterCall",
            Self::Combine { .. } => "combine",
            Self::Result { .. } => "result",
        }
    }

    fn frame(&self) -> FrameEffect {
        match self {
            Self::Segment { .. } => FrameEffect::Open,
            Self::Base { .. } | Self::Result { .. } => FrameEffect::Close,
            Self::Combine { .. } => FrameEffect::Land,
            _ => FrameEffect::Inline,
        }
    }
}

struct Builder {
    out: Vec<KaratsubaAction>,
}

impl Builder {
    fn sub(&mut self, which: Term, x: &[u8], y: &[u8]) -> u128 {
        self.out.push(KaratsubaAction::Call { which });
        let value = self.kmult(x, y);
        self.out.push(KaratsubaAction::AfterCall { which, value });
        value
    }

    fn kmult(&mut self, x: &[u8], y: &[u8]) -> u128 {
        let n = x.len().max(y.len()).max(1);
        let (x, y) = (pad_to(x, n), pad_to(y, n));
        self.out.push(KaratsubaAction::Segment {
            n,
            x: from_digits(&x),
            y: from_digits(&y),
        });

        if n == 1 {
            let (a, b) = (u128::from(x[0]), u128::from(y[0]));
            let product = a * b;
            self.out.push(KaratsubaAction::Base { x: a, y: b, product });
            return product;
        }

        let m = n / 2;
        let (xh, xl) = split_digits(&x, m);
        let (yh, yl) = split_digits(&y, m);
        self.out.push(KaratsubaAction::Split {
            m,
            x_high: from_digits(&xh),
            x_low: from_digits(&xl),
            y_high: from_digits(&yh),
            y_low: from_digits(&yl),
        });

        let z0 = self.sub(Term::Z0, &xl, &yl);
        let z2 = self.sub(Term::Z2, &xh, &yh);
        let z1raw = self.sub(Term::Z1, &add_digits(&xh, &xl), &add_digits(&yh, &yl));
        self.out.push(KaratsubaAction::Combine { m, z0, z2, z1raw });

        let value = compose(m, z0, z1raw, z2);
        self.out.push(KaratsubaAction::Result { value });
        value
    }
}

/// `z2·10^(2m) + (z1raw − z0 − z2)·10^m + z0`.
fn compose(m: usize, z0: u128, z1raw: u128, z2: u128) -> u128 {
    let m = u32::try_from(m).unwrap_or(u32::MAX);
    let z1 = z1raw - z0 - z2;
    z2 * 10u128.pow(2 * m) + z1 * 10u128.pow(m) + z0
}

/// Multiply once with Karatsuba, recording every action.
#[must_use]
pub fn build_trace(input: &KaratsubaInput) -> Vec<KaratsubaAction> {
    let (x, y) = input.digit_rows();
    let mut b = Builder { out: Vec::new() };
    b.kmult(&x, &y);
    debug!(digits = x.len(), actions = b.out.len(), "karatsuba trace built");
    b.out
}

/// Reference product.
#[must_use]
pub const fn multiply_direct(input: &KaratsubaInput) -> u128 {
    input.x * input.y
}

#[derive(Clone, Copy, Debug, Default)]
struct Frame {
    n: usize,
    m: Option<usize>,
    x_high: Option<u128>,
    x_low: Option<u128>,
    y_high: Option<u128>,
    y_low: Option<u128>,
    z0: Option<u128>,
    z1: Option<u128>,
    z2: Option<u128>,
}

/// Derived replay state for Karatsuba.
#[derive(Clone, Debug)]
pub struct KaratsubaState {
    rows: (Vec<u8>, Vec<u8>),
    frames: Vec<Frame>,
    last: Option<u128>,
    line: u8,
}

impl KaratsubaState {
    /// Fresh state for `input`.
    #[must_use]
    pub fn new(input: &KaratsubaInput) -> Self {
        Self {
            rows: input.digit_rows(),
            frames: Vec::new(),
            last: None,
            line: 1,
        }
    }

    /// Zero-padded digit rows of both operands.
    #[must_use]
    pub fn rows(&self) -> (&[u8], &[u8]) {
        (&self.rows.0, &self.rows.1)
    }

    /// Value returned by the most recently finished call.
    #[must_use]
    pub const fn last_value(&self) -> Option<u128> {
        self.last
    }
}

impl ReplayState for KaratsubaState {
    type Action = KaratsubaAction;

    fn apply(&mut self, action: &KaratsubaAction) {
        match *action {
            KaratsubaAction::Segment { n, .. } => {
                self.frames.push(Frame {
                    n,
                    ..Frame::default()
                });
                self.line = 2;
            }
            KaratsubaAction::Base { product, .. } => {
                self.frames.pop();
                self.last = Some(product);
                self.line = 3;
            }
            KaratsubaAction::Split {
                m,
                x_high,
                x_low,
                y_high,
                y_low,
            } => {
                if let Some(f) = self.frames.last_mut() {
                    f.m = Some(m);
                    f.x_high = Some(x_high);
                    f.x_low = Some(x_low);
                    f.y_high = Some(y_high);
                    f.y_low = Some(y_low);
                }
                self.line = 4;
            }
            KaratsubaAction::Call { which } => {
                self.line = match which {
                    Term::Z0 => 7,
                    Term::Z2 => 8,
                    Term::Z1 => 9,
                };
            }
            KaratsubaAction::AfterCall { which, value } => {
                if let Some(f) = self.frames.last_mut() {
                    match which {
                        Term::Z0 => f.z0 = Some(value),
                        Term::Z1 => f.z1 = Some(value),
                        Term::Z2 => f.z2 = Some(value),
                    }
                }
            }
            KaratsubaAction::Combine { z0, z2, z1raw, .. } => {
                if let Some(f) = self.frames.last_mut() {
                    f.z0 = Some(z0);
                    f.z2 = Some(z2);
                    f.z1 = Some(z1raw - z0 - z2);
                }
                self.line = 10;
            }
            KaratsubaAction::Result { value } => {
                self.frames.pop();
                self.last = Some(value);
                self.line = 10;
            }
        }
    }

    fn highlights(&self) -> Highlights {
        Highlights {
            split_digits: self.frames.last().and_then(|f| f.m),
            ..Highlights::default()
        }
    }

    fn locals(&self) -> Locals {
        let f = self.frames.last().copied();
        let get = |pick: fn(&Frame) -> Option<u128>| f.as_ref().and_then(pick).map(Local::from);
        Locals::with_names(&["n", "m", "xL", "xR", "yL", "yR", "z0", "z1", "z2"])
            .with("n", f.map(|f| Local::from(f.n)))
            .with("m", f.and_then(|f| f.m).map(Local::from))
            .with("xL", get(|f| f.x_high))
            .with("xR", get(|f| f.x_low))
            .with("yL", get(|f| f.y_high))
            .with("yR", get(|f| f.y_low))
            .with("z0", get(|f| f.z0))
            .with("z1", get(|f| f.z1))
            .with("z2", get(|f| f.z2))
    }

    fn result_text(&self) -> String {
        self.last.map_or_else(String::new, |v| v.to_string())
    }

    fn line(&self) -> Option<u8> {
        Some(self.line)
    }
}

/// Karatsuba multiplication, traced.
#[derive(Clone, Copy, Debug, Default)]
pub struct Karatsuba;

impl Algorithm for Karatsuba {
    const NAME: &'static str = "karatsuba";
    type Input = KaratsubaInput;
    type Action = KaratsubaAction;
    type State = KaratsubaState;

    fn build_trace(input: &KaratsubaInput) -> Vec<KaratsubaAction> {
        build_trace(input)
    }

    fn initial_state(input: &KaratsubaInput) -> KaratsubaState {
        KaratsubaState::new(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_result(input: &KaratsubaInput) -> u128 {
        match build_trace(input).last() {
            Some(KaratsubaAction::Result { value } | KaratsubaAction::Base { product: value, .. }) => {
                *value
            }
            other => panic!("unexpected tail {other:?}"),
        }
    }

    #[test]
    fn input_is_clamped() {
        let k = KaratsubaInput::new(123_456, 9_999_999, 4);
        assert_eq!((k.x, k.y, k.digits), (9_999, 9_999, 4));
        assert_eq!(KaratsubaInput::new(5, 5, 0).digits, 1);
        assert_eq!(KaratsubaInput::new(0, 0, 99).digits, 12);
    }

    #[test]
    fn single_digit_is_segment_then_base() {
        let log = build_trace(&KaratsubaInput::new(7, 8, 1));
        assert_eq!(
            log,
            vec![
                KaratsubaAction::Segment { n: 1, x: 7, y: 8 },
                KaratsubaAction::Base { x: 7, y: 8, product: 56 },
            ]
        );
    }

    #[test]
    fn calls_run_z0_z2_z1_in_order() {
        let log = build_trace(&KaratsubaInput::new(12, 34, 2));
        let calls: Vec<Term> = log
            .iter()
            .filter_map(|a| match a {
                KaratsubaAction::Call { which } => Some(*which),
                _ => None,
            })
            .collect();
        assert_eq!(calls[..3], [Term::Z0, Term::Z2, Term::Z1]);
        assert!(matches!(
            log[1],
            KaratsubaAction::Split { m: 1, x_high: 1, x_low: 2, y_high: 3, y_low: 4 }
        ));
        assert_eq!(last_result(&KaratsubaInput::new(12, 34, 2)), 408);
    }

    #[test]
    fn unequal_lengths_are_padded() {
        let k = KaratsubaInput::new(5, 1234, 4);
        assert_eq!(k.digit_rows().0, vec![0, 0, 0, 5]);
        assert_eq!(last_result(&k), 6170);
    }

    #[test]
    fn operands_are_padded_to_the_configured_digits() {
        let input = KaratsubaInput::new(5, 7, 6);
        let (x, y) = input.digit_rows();
        assert_eq!(x, vec![0, 0, 0, 0, 0, 5]);
        assert_eq!(y.len(), 6);

        let log = build_trace(&input);
        assert!(matches!(log[0], KaratsubaAction::Segment { n: 6, x: 5, y: 7 }));
        assert!(matches!(log[1], KaratsubaAction::Split { m: 3, x_high: 0, x_low: 5, .. }));
        assert_eq!(last_result(&input), 35);

        let s = KaratsubaState::new(&input);
        assert_eq!(s.rows().0.len(), 6);
        assert_eq!(s.rows().1.len(), 6);
    }

    #[test]
    fn replay_fills_z_locals_at_combine() {
        let input = KaratsubaInput::new(1234, 5678, 4);
        let log = build_trace(&input);
        let root_combine = log
            .iter()
            .rposition(|a| matches!(a, KaratsubaAction::Combine { .. }))
            .unwrap();
        let mut s = KaratsubaState::new(&input);
        for a in &log[..=root_combine] {
            s.apply(a);
        }
        let locals = s.locals();
        assert_eq!(locals.get("z0"), Some(Local::from(34u128 * 78)));
        assert_eq!(locals.get("z2"), Some(Local::from(12u128 * 56)));
        assert_eq!(locals.get("xL"), Some(Local::from(12u128)));
        assert_eq!(s.highlights().split_digits, Some(2));
        s.apply(&log[root_combine + 1]);
        assert_eq!(s.result_text(), (1234 * 5678).to_string());
        assert!(s.locals().get("n").is_none());
    }
}
