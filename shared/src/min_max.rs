use glam::Vec3;

/// Some volume defined by a minimum and maximum.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MinMax<T> {
	pub min: T,
	pub max: T,
}

impl<T> MinMax<T> where T: Clone {
	pub fn new(a: T) -> Self {
		Self { min: a.clone(), max: a }
	}
}

/// Component-wise vector types that can grow a `MinMax`.
pub trait Extent: Copy {
	fn min(self, other: Self) -> Self;
	fn max(self, other: Self) -> Self;
	fn all_le(self, other: Self) -> bool;
}

impl Extent for Vec3 {
	fn min(self, other: Self) -> Self { Vec3::min(self, other) }
	fn max(self, other: Self) -> Self { Vec3::max(self, other) }
	fn all_le(self, other: Self) -> bool { self.cmple(other).all() }
}

pub trait VecMinMax<T> {
	fn update(&mut self, v: T);
	fn contains_point(&self, v: T) -> bool;
}

impl<T> VecMinMax<T> for MinMax<T> where T: Extent {
	fn update(&mut self, a: T) {
		self.min = self.min.min(a);
		self.max = self.max.max(a);
	}
	
	fn contains_point(&self, a: T) -> bool {
		self.min.all_le(a) && a.all_le(self.max)
	}
}

pub trait VecMinMaxFromIterator: Iterator {
	fn min_max(self) -> Option<MinMax<Self::Item>>;
}

impl<T> VecMinMaxFromIterator for T where T: Iterator, T::Item: Extent {
	fn min_max(mut self) -> Option<MinMax<Self::Item>> {
		let mut min_max = MinMax::new(self.next()?);
		for a in self {
			min_max.update(a);
		}
		Some(min_max)
	}
}

#[cfg(test)]
mod tests {
	use glam::vec3;
	use super::*;
	
	#[test]
	fn min_max_of_points() {
		let points = [vec3(1.0, -2.0, 3.0), vec3(-1.0, 4.0, 0.0), vec3(0.5, 0.0, 9.0)];
		let bounds = points.into_iter().min_max().unwrap();
		assert_eq!(bounds.min, vec3(-1.0, -2.0, 0.0));
		assert_eq!(bounds.max, vec3(1.0, 4.0, 9.0));
		assert!(bounds.contains_point(vec3(0.0, 0.0, 1.0)));
		assert!(!bounds.contains_point(vec3(0.0, 5.0, 1.0)));
	}
	
	#[test]
	fn empty_iterator_has_no_bounds() {
		assert!(std::iter::empty::<Vec3>().min_max().is_none());
	}
}
