use super::{Markers, Space};

/// An element followed by the whitespace preceding its trailing separator
#[derive(Debug, Clone, PartialEq)]
pub struct RightPadded<T> {
    pub element: T,
    pub after: Space,
    pub markers: Markers,
}

impl<T> RightPadded<T> {
    pub fn new(element: T, after: Space) -> Self {
        RightPadded {
            element,
            after,
            markers: Markers::EMPTY,
        }
    }

    pub fn build(element: T) -> Self {
        Self::new(element, Space::EMPTY)
    }

    pub fn with_element<U>(&self, element: U) -> RightPadded<U> {
        RightPadded {
            element,
            after: self.after.clone(),
            markers: self.markers.clone(),
        }
    }

    pub fn with_after(&self, after: Space) -> Self
    where
        T: Clone,
    {
        RightPadded {
            element: self.element.clone(),
            after,
            markers: self.markers.clone(),
        }
    }
}

/// An element preceded by a separator and the whitespace before it
#[derive(Debug, Clone, PartialEq)]
pub struct LeftPadded<T> {
    pub before: Space,
    pub element: T,
}

impl<T> LeftPadded<T> {
    pub fn new(before: Space, element: T) -> Self {
        LeftPadded { before, element }
    }

    pub fn with_element<U>(&self, element: U) -> LeftPadded<U> {
        LeftPadded {
            before: self.before.clone(),
            element,
        }
    }
}

/// A delimited, separated list: `before` precedes the opening delimiter
#[derive(Debug, Clone, PartialEq)]
pub struct Container<T> {
    pub before: Space,
    pub elements: Vec<RightPadded<T>>,
    pub markers: Markers,
}

impl<T> Container<T> {
    pub fn new(before: Space, elements: Vec<RightPadded<T>>) -> Self {
        Container {
            before,
            elements,
            markers: Markers::EMPTY,
        }
    }

    pub fn with_elements<U>(&self, elements: Vec<RightPadded<U>>) -> Container<U> {
        Container {
            before: self.before.clone(),
            elements,
            markers: self.markers.clone(),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().map(|rp| &rp.element)
    }
}
