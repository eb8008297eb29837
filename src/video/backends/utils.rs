use std::borrow::Borrow;

use crate::utils::handle::Handle;

/// Maps handles allocated by the `VideoSystem` to the native objects of a backend.
#[derive(Debug)]
pub struct DataVec<T>
where
    T: Sized + Clone,
{
    pub buf: Vec<Option<T>>,
    pub versions: Vec<u32>,
}

impl<T> DataVec<T>
where
    T: Sized + Clone,
{
    pub fn new() -> Self {
        DataVec {
            buf: Vec::new(),
            versions: Vec::new(),
        }
    }

    pub fn get<H>(&self, handle: H) -> Option<&T>
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        if let Some(&v) = self.versions.get(index) {
            if v == handle.version() {
                return self.buf[index].as_ref();
            }
        }

        None
    }

    pub fn get_mut<H>(&mut self, handle: H) -> Option<&mut T>
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        if let Some(&v) = self.versions.get(index) {
            if v == handle.version() {
                return self.buf[index].as_mut();
            }
        }

        None
    }

    pub fn create<H>(&mut self, handle: H, value: T)
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;

        if self.buf.len() <= index {
            self.buf.resize(index + 1, None);
            self.versions.resize(index + 1, 0);
        }

        self.buf[index] = Some(value);
        self.versions[index] = handle.version();
    }

    pub fn free<H>(&mut self, handle: H) -> Option<T>
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].take(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn versions() {
        let mut v = DataVec::new();
        let h1 = Handle::new(3, 1);
        v.create(h1, "a");
        assert_eq!(v.get(h1), Some(&"a"));
        assert_eq!(v.get(Handle::new(3, 2)), None);
        assert_eq!(v.get(Handle::new(1, 1)), None);

        assert_eq!(v.free(Handle::new(3, 2)), None);
        assert_eq!(v.free(h1), Some("a"));
        assert_eq!(v.get(h1), None);
        assert_eq!(v.free(h1), None);
    }
}
