use crate::{
  abstractions::{HashMap, IString},
  core::sort::{Sort, SortId},
};

/// The declaration-ordered set of sorts owned by a registry, with a name index.
#[derive(Default)]
pub struct SortCollection {
  sorts  : Vec<Sort>,
  by_name: HashMap<IString, SortId>,
}

impl SortCollection {
  pub fn new() -> Self {
    Self::default()
  }

  /// Reserves the next `SortId` for `name` and installs an empty sort skeleton under
  /// it. The caller is responsible for checking for duplicates first.
  pub fn reserve(&mut self, name: IString) -> SortId {
    let index = SortId(self.sorts.len() as u32);
    self.sorts.push(Sort::new(name.clone(), index));
    self.by_name.insert(name, index);
    index
  }

  #[inline(always)]
  pub fn contains(&self, name: &IString) -> bool {
    self.by_name.contains_key(name)
  }

  #[inline(always)]
  pub fn id_of(&self, name: &IString) -> Option<SortId> {
    self.by_name.get(name).copied()
  }

  #[inline(always)]
  pub fn get(&self, index: SortId) -> &Sort {
    &self.sorts[index.idx()]
  }

  #[inline(always)]
  pub fn get_mut(&mut self, index: SortId) -> &mut Sort {
    &mut self.sorts[index.idx()]
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.sorts.len()
  }

  /// Iterates the sorts in declaration order.
  pub fn iter(&self) -> std::slice::Iter<'_, Sort> {
    self.sorts.iter()
  }
}
