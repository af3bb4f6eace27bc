/// 2x3 affine matrix: `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
///
/// Pixel space, y down. A positive rotation turns clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    pub fn rotate(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn rotate_about(angle: f32, cx: f32, cy: f32) -> Self {
        Self::translate(-cx, -cy)
            .then(Self::rotate(angle))
            .then(Self::translate(cx, cy))
    }

    /// Mirror across the vertical and/or horizontal line through `(cx, cy)`
    pub fn flip_about(horizontal: bool, vertical: bool, cx: f32, cy: f32) -> Self {
        let sx = if horizontal { -1.0 } else { 1.0 };
        let sy = if vertical { -1.0 } else { 1.0 };
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: cx - sx * cx,
            f: cy - sy * cy,
        }
    }

    /// `self` first, then `next`
    #[must_use]
    pub fn then(self, next: Affine) -> Self {
        Self {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            e: next.a * self.e + next.c * self.f + next.e,
            f: next.b * self.e + next.d * self.f + next.f,
        }
    }

    /// None when the matrix collapses the plane
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(p: (f32, f32), q: (f32, f32)) -> bool {
        (p.0 - q.0).abs() < 1e-4 && (p.1 - q.1).abs() < 1e-4
    }

    #[test]
    fn test_then_applies_left_first() {
        let m = Affine::translate(1.0, 0.0).then(Affine::scale(2.0, 2.0));
        assert!(close(m.apply(0.0, 0.0), (2.0, 0.0)));
    }

    #[test]
    fn test_rotate_about_keeps_center() {
        let m = Affine::rotate_about(FRAC_PI_2, 5.0, 5.0);
        assert!(close(m.apply(5.0, 5.0), (5.0, 5.0)));
        // Quarter turn clockwise on screen: right of center goes below it.
        assert!(close(m.apply(6.0, 5.0), (5.0, 6.0)));
    }

    #[test]
    fn test_flip_about_mirrors() {
        let m = Affine::flip_about(true, false, 4.0, 4.0);
        assert!(close(m.apply(0.0, 1.0), (8.0, 1.0)));
        let both = Affine::flip_about(true, true, 4.0, 4.0);
        assert!(close(both.apply(1.0, 2.0), (7.0, 6.0)));
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = Affine::rotate_about(0.7, 3.0, 2.0)
            .then(Affine::scale(2.0, 0.5))
            .then(Affine::translate(10.0, -4.0));
        let inv = m.inverse().unwrap();
        let (x, y) = m.apply(1.5, -2.5);
        assert!(close(inv.apply(x, y), (1.5, -2.5)));
        assert!(close(m.then(inv).apply(9.0, 9.0), (9.0, 9.0)));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Affine::scale(0.0, 1.0).inverse().is_none());
    }
}
