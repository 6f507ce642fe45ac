use std::hash::BuildHasher;
use std::marker::PhantomData;

use bytemuck::Pod;
use rustc_hash::FxBuildHasher;

use crate::compare::Bytewise;
use crate::config::MapBuilder;
use crate::error::Result;
use crate::map::BlobMap;

/// A [`BlobMap`] keyed and valued by plain-old-data types.
///
/// Key and value sizes come from `size_of::<K>()` and `size_of::<V>()`, keys
/// are compared bytewise, and hashing defaults to Fx since integer keys are
/// full of NUL bytes that would cut a djb2 hash short.
pub struct PodMap<K, V, S = FxBuildHasher> {
    inner: BlobMap<Bytewise, S>,
    _marker: PhantomData<(K, V)>,
}

impl<K: Pod, V: Pod> PodMap<K, V> {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, FxBuildHasher)
    }
}

impl<K, V, S> PodMap<K, V, S>
where
    K: Pod,
    V: Pod,
    S: BuildHasher,
{
    /// Fails for zero-sized `K` or `V`, like any blob map with a zero size.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self> {
        let inner = MapBuilder::new()
            .key_size(size_of::<K>())
            .value_size(size_of::<V>())
            .capacity(capacity)
            .comparator(Bytewise)
            .hasher(hasher)
            .build()?;
        Ok(Self {
            inner,
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Insert a key-value pair, returning the previous value if it existed
    pub fn insert(&mut self, key: &K, value: &V) -> Result<Option<V>> {
        let old = self
            .inner
            .insert(bytemuck::bytes_of(key), bytemuck::bytes_of(value))?;
        Ok(old.map(|bytes| bytemuck::pod_read_unaligned(&bytes)))
    }

    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let value = self.inner.get(bytemuck::bytes_of(key))?;
        Ok(value.map(bytemuck::pod_read_unaligned))
    }

    pub fn contains_key(&self, key: &K) -> Result<bool> {
        self.inner.contains_key(bytemuck::bytes_of(key))
    }

    pub fn remove(&mut self, key: &K) -> Result<Option<V>> {
        let old = self.inner.take(bytemuck::bytes_of(key))?;
        Ok(old.map(|bytes| bytemuck::pod_read_unaligned(&bytes)))
    }

    /// Decoded copies of the live entries, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.inner.iter().map(|(k, v)| {
            (
                bytemuck::pod_read_unaligned(k),
                bytemuck::pod_read_unaligned(v),
            )
        })
    }

    /// The untyped map underneath
    pub fn as_blob_map(&self) -> &BlobMap<Bytewise, S> {
        &self.inner
    }
}
