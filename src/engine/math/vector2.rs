use std::ops::*;

/// a point (or direction) in osu playfield space
#[derive(Copy, Clone, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f32;2]", into = "[f32;2]")]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}
impl Vector2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self { Self { x, y } }

    pub fn from_angle(a:f32) -> Self {
        Self::new(a.cos(), a.sin())
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn normalize(self) -> Self {
        let magnitude = self.length();
        if magnitude == 0.0 { self }
        else { self / magnitude }
    }

    pub fn distance(&self, p2: Self) -> f32 {
        self.distance_squared(p2).sqrt()
    }
    pub fn distance_squared(&self, p2: Self) -> f32 {
        (self.x - p2.x).powi(2) + (self.y - p2.y).powi(2)
    }

    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }

    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32;2]> for Vector2 {
    fn from(value: [f32;2]) -> Self {
        Self::new(value[0], value[1])
    }
}
impl From<Vector2> for [f32;2] {
    fn from(value: Vector2) -> Self {
        [value.x, value.y]
    }
}
impl From<(i32, i32)> for Vector2 {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x as f32, y as f32)
    }
}

impl std::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x: {}, y: {}", self.x, self.y)
    }
}

// negative nancy
impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Self::Output {
        Vector2::new(-self.x, -self.y)
    }
}

// add
impl Add<Vector2> for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Self::Output {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

// sub
impl Sub<Vector2> for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Self::Output {
        self + -rhs
    }
}

// mul
impl Mul<f32> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f32) -> Self::Output {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

// div
impl Div<f32> for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: f32) -> Self::Output {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}


#[test]
fn vector_math() {
    let a = Vector2::new(3.0, 4.0);
    assert_eq!(a.length(), 5.0);
    assert_eq!(a.normalize(), Vector2::new(0.6, 0.8));
    assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
    assert_eq!(Vector2::lerp(Vector2::ZERO, Vector2::new(10.0, -10.0), 0.5), Vector2::new(5.0, -5.0));
    assert_eq!(a.cross(Vector2::new(6.0, 8.0)), 0.0);

    let json = serde_json::to_string(&a).unwrap();
    assert_eq!(json, "[3.0,4.0]");
}
