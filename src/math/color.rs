use cgmath::BaseFloat;
use serde::{Deserialize, Serialize};

/// A RGBA `Color`. Each color component is a floating point value
/// with a range from 0 to 1.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color<S> {
    pub r: S,
    pub g: S,
    pub b: S,
    pub a: S,
}

impl<S: BaseFloat> From<[S; 4]> for Color<S> {
    fn from(v: [S; 4]) -> Self {
        Color::new(v[0], v[1], v[2], v[3])
    }
}

impl<S: BaseFloat> Color<S> {
    pub fn new(r: S, g: S, b: S, a: S) -> Self {
        Color { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Color::new(S::zero(), S::zero(), S::zero(), S::zero())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn transparent() {
        let c = Color::<f32>::transparent();
        assert_eq!(c, Color::from([0.0, 0.0, 0.0, 0.0]));
    }
}
