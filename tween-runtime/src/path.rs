//! # Path 模块
//!
//! 路径插值所需的几何接口，以及基于折线的默认实现。
//!
//! 补间只通过 [`TweenPath`] 的两个方法访问路径：
//! 总长度和按距离取点。曲线在构建时被展开为折线段。

use crate::point::Point;

/// 曲线展开时使用的段数
pub const CURVE_SEGMENTS: usize = 20;

/// 路径几何接口
pub trait TweenPath {
    /// 路径可行进的总长度
    fn total_distance(&self) -> f32;

    /// 沿路径行进 `distance` 后所在的点
    fn point_at_distance(&self, distance: f32) -> Point;
}

/// 折线路径
///
/// ```rust,ignore
/// let path = Polyline::new()
///     .move_to(0.0, 0.0)
///     .line_to(100.0, 0.0)
///     .quadratic_curve_to(150.0, 50.0, 100.0, 100.0)
///     .close();
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
    /// `lengths[i]` 为起点到 `points[i]` 的累计长度
    lengths: Vec<f32>,
    closed: bool,
}

impl Polyline {
    /// 创建空路径
    pub fn new() -> Self {
        Self::default()
    }

    /// 由点序列创建路径
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        points
            .into_iter()
            .fold(Self::new(), |path, p| path.line_to(p.x, p.y))
    }

    /// 设置起点（清空已有的点）
    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.points.clear();
        self.lengths.clear();
        self.closed = false;
        self.push(Point::new(x, y));
        self
    }

    /// 直线连接到指定点
    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.push(Point::new(x, y));
        self
    }

    /// 二次贝塞尔曲线
    pub fn quadratic_curve_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        let start = self.last_or_origin();
        let control = Point::new(cx, cy);
        let end = Point::new(x, y);

        for i in 1..=CURVE_SEGMENTS {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let a = start.lerp(control, t);
            let b = control.lerp(end, t);
            self.push(a.lerp(b, t));
        }
        self
    }

    /// 三次贝塞尔曲线
    pub fn bezier_curve_to(
        mut self,
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x: f32,
        y: f32,
    ) -> Self {
        let start = self.last_or_origin();
        let c1 = Point::new(c1x, c1y);
        let c2 = Point::new(c2x, c2y);
        let end = Point::new(x, y);

        for i in 1..=CURVE_SEGMENTS {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let u = 1.0 - t;
            let px = u * u * u * start.x
                + 3.0 * u * u * t * c1.x
                + 3.0 * u * t * t * c2.x
                + t * t * t * end.x;
            let py = u * u * u * start.y
                + 3.0 * u * u * t * c1.y
                + 3.0 * u * t * t * c2.y
                + t * t * t * end.y;
            self.push(Point::new(px, py));
        }
        self
    }

    /// 闭合路径（末点连回起点）
    pub fn close(mut self) -> Self {
        self.closed = true;
        self
    }

    /// 是否闭合
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 顶点数量
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// 获取第 `index` 个顶点
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// 两个顶点之间沿路径的距离
    pub fn distance_between(&self, from: usize, to: usize) -> Option<f32> {
        let a = *self.lengths.get(from)?;
        let b = *self.lengths.get(to)?;
        Some((b - a).abs())
    }

    fn push(&mut self, point: Point) {
        let length = match (self.points.last(), self.lengths.last()) {
            (Some(prev), Some(len)) => len + prev.distance(point),
            _ => 0.0,
        };
        self.points.push(point);
        self.lengths.push(length);
    }

    fn last_or_origin(&self) -> Point {
        self.points.last().copied().unwrap_or_default()
    }

    /// 闭合段的长度（末点到起点）
    fn closing_length(&self) -> f32 {
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) => last.distance(*first),
            _ => 0.0,
        }
    }
}

impl TweenPath for Polyline {
    fn total_distance(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0) + self.closing_length()
    }

    fn point_at_distance(&self, distance: f32) -> Point {
        let Some(&first) = self.points.first() else {
            return Point::zero();
        };

        // NaN 无法参与比较，落在起点
        if distance.is_nan() {
            return first;
        }

        let distance = distance.clamp(0.0, self.total_distance());
        let open_length = self.lengths.last().copied().unwrap_or(0.0);

        if distance >= open_length {
            // 位于闭合段，或恰好在末点
            let last = self.points[self.points.len() - 1];
            let closing = self.closing_length();
            if closing <= 0.0 {
                return last;
            }
            return last.lerp(first, (distance - open_length) / closing);
        }

        // 第一个累计长度超过 distance 的顶点即为所在段的终点
        let end = self.lengths.partition_point(|&len| len <= distance);
        let start = end - 1;
        let segment = self.lengths[end] - self.lengths[start];
        if segment <= 0.0 {
            return self.points[start];
        }
        let t = (distance - self.lengths[start]) / segment;
        self.points[start].lerp(self.points[end], t)
    }
}
