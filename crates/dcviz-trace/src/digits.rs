//! Decimal digit vectors, most-significant digit first.

/// Decimal digits of `v`, left-padded with zeros to at least `pad` digits.
#[must_use]
pub fn to_digits(v: u128, pad: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rest = v;
    loop {
        out.push(u8::try_from(rest % 10).unwrap_or(0));
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    while out.len() < pad {
        out.push(0);
    }
    out.reverse();
    out
}

/// Numeric value of a digit vector (empty ⇒ 0).
#[must_use]
pub fn from_digits(d: &[u8]) -> u128 {
    d.iter().fold(0u128, |acc, &x| acc * 10 + u128::from(x))
}

/// Left-pad `d` with zeros to length `n` (no-op if already longer).
#[must_use]
pub fn pad_to(d: &[u8], n: usize) -> Vec<u8> {
    let mut out = vec![0; n.saturating_sub(d.len())];
    out.extend_from_slice(d);
    out
}

/// Split into `(high, low)` where `low` holds the `m` least-significant digits.
#[must_use]
pub fn split_digits(d: &[u8], m: usize) -> (Vec<u8>, Vec<u8>) {
    let cut = d.len().saturating_sub(m);
    (d[..cut].to_vec(), d[cut..].to_vec())
}

/// Schoolbook addition with carry; operands may differ in length.
#[must_use]
pub fn add_digits(a: &[u8], b: &[u8]) -> Vec<u8> {
    let n = a.len().max(b.len());
    let a = pad_to(a, n);
    let b = pad_to(b, n);
    let mut out = Vec::with_capacity(n + 1);
    let mut carry = 0u8;
    for i in (0..n).rev() {
        let s = a[i] + b[i] + carry;
        out.push(s % 10);
        carry = s / 10;
    }
    if carry > 0 {
        out.push(carry);
    }
    out.reverse();
    out
}
