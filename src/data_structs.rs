use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Index, IndexMut},
};

/// Label that is used for indexing into collections.
pub struct Label<T> {
    value: usize,
    object_type: PhantomData<T>,
}

/// Collection with stable labels; removed slots are reused by later inserts. Can be indexed using `Label`.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    elements: Vec<Element<T>>,
    current_hole: usize,
    size: usize,
}

/// Iterator over the labels in use in a `Pool`.
#[derive(Debug)]
pub struct PoolIter<'a, T> {
    pool: &'a Pool<T>,
    index: usize,
}

#[derive(Debug, PartialEq, Clone)]
enum Element<T> {
    Object(T),
    Hole(usize),
}

impl<T> Label<T> {
    pub fn new(value: usize) -> Label<T> {
        Label {
            value,
            object_type: PhantomData,
        }
    }

    pub fn value(&self) -> usize {
        self.value
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Pool {
            elements: Vec::new(),
            current_hole: 0,
            size: 0,
        }
    }

    /// Insert an `object`, and return its `Label`.
    pub fn insert(&mut self, object: T) -> Label<T> {
        let label = self.current_hole;
        if label == self.elements.len() {
            self.elements.push(Element::Object(object));
            self.current_hole = self.elements.len();
        } else if let Element::Hole(next) = self.elements[label] {
            self.elements[label] = Element::Object(object);
            self.current_hole = next;
        } else {
            unreachable!("current hole ({label}) should be a hole");
        }
        self.size += 1;
        Label::new(label)
    }

    /// Remove the object with a given `Label`, returning it if it was present.
    pub fn remove(&mut self, label: Label<T>) -> Option<T> {
        if !self.contains(label) {
            return None;
        }
        let index = label.value;
        let element = std::mem::replace(&mut self.elements[index], Element::Hole(self.current_hole));
        self.current_hole = index;
        self.size -= 1;
        match element {
            Element::Object(object) => Some(object),
            Element::Hole(_) => None,
        }
    }

    pub fn get(&self, label: Label<T>) -> Option<&T> {
        match self.elements.get(label.value) {
            Some(Element::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, label: Label<T>) -> Option<&mut T> {
        match self.elements.get_mut(label.value) {
            Some(Element::Object(object)) => Some(object),
            _ => None,
        }
    }

    /// Return the total number of objects in the `Pool`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if the `Pool` contains an object with a given `Label`.
    pub fn contains(&self, label: Label<T>) -> bool {
        matches!(self.elements.get(label.value), Some(Element::Object(_)))
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool::new()
    }
}

impl<'a, T> IntoIterator for &'a Pool<T> {
    type Item = Label<T>;
    type IntoIter = PoolIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        PoolIter {
            pool: self,
            index: 0,
        }
    }
}

impl<'a, T> Iterator for PoolIter<'a, T> {
    type Item = Label<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let size = self.pool.elements.len();
        for i in self.index..size {
            if let Element::Object(_) = self.pool.elements[i] {
                self.index = i + 1;
                return Some(Label::new(i));
            }
        }
        self.index = size;
        None
    }
}

impl<T> Index<Label<T>> for Pool<T> {
    type Output = T;

    fn index(&self, label: Label<T>) -> &Self::Output {
        match &self.elements[label.value] {
            Element::Object(object) => object,
            Element::Hole(_) => panic!("Label {} is not in use!", label.value),
        }
    }
}

impl<T> IndexMut<Label<T>> for Pool<T> {
    fn index_mut(&mut self, label: Label<T>) -> &mut Self::Output {
        match &mut self.elements[label.value] {
            Element::Object(object) => object,
            Element::Hole(_) => panic!("Label {} is not in use!", label.value),
        }
    }
}

impl<T> From<usize> for Label<T> {
    fn from(value: usize) -> Self {
        Label::new(value)
    }
}

impl<T> Copy for Label<T> {}

impl<T> Clone for Label<T> {
    fn clone(&self) -> Label<T> {
        *self
    }
}

impl<T> PartialEq for Label<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Label<T> {}

impl<T> PartialOrd for Label<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Label<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Label<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Label").field("value", &self.value).finish()
    }
}

impl<T> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
