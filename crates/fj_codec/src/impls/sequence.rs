use alloc::collections::{BTreeSet, VecDeque};
use core::any::Any;
use core::hash::{BuildHasher, Hash};
use std::collections::HashSet;

use fj_utils::hash::hashbrown;

use crate::error::JsonResult;
use crate::info::{BoxedValue, GenericDescriptorCell, JsonType, SeqFill, SeqInfo, TypeDescriptor};
use crate::info::{downcast_mut, downcast_ref, unbox};

fn collect<C, T>(items: Vec<BoxedValue>) -> JsonResult<C>
where
    C: FromIterator<T>,
    T: JsonType,
{
    items.into_iter().map(unbox::<T>).collect()
}

// -----------------------------------------------------------------------------
// Filled in place

macro_rules! impl_growable {
    ($ty:ident, $push:ident) => {
        impl<T: JsonType + Default> JsonType for $ty<T> {
            fn descriptor() -> &'static TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeDescriptor::of::<Self>()
                        .with_is_default(|v| v.downcast_ref::<Self>().is_some_and($ty::is_empty))
                        .with_ordered(SeqInfo::new::<T>(
                            |v| Ok(downcast_ref::<Self>(v)?.len()),
                            |v| Ok(Box::new(downcast_ref::<Self>(v)?.iter().map(|x| x as &dyn Any))),
                            SeqFill::InPlace {
                                clear: |v| {
                                    downcast_mut::<Self>(v)?.clear();
                                    Ok(())
                                },
                                push_default: |v| {
                                    let list = downcast_mut::<Self>(v)?;
                                    let index = list.len();
                                    list.$push(T::default());
                                    Ok(&mut list[index])
                                },
                            },
                        ))
                })
            }
        }
    };
}

impl_growable!(Vec, push);
impl_growable!(VecDeque, push_back);

// -----------------------------------------------------------------------------
// Collected

impl<T: JsonType + Default, const N: usize> JsonType for [T; N] {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::with_constructor::<Self>(|| {
                Box::new(core::array::from_fn::<T, N, _>(|_| T::default()))
            })
            .with_ordered(SeqInfo::new::<T>(
                |_| Ok(N),
                |v| Ok(Box::new(downcast_ref::<Self>(v)?.iter().map(|x| x as &dyn Any))),
                SeqFill::Collect {
                    len: Some(N),
                    assign: |v, items| {
                        let array = downcast_mut::<Self>(v)?;
                        for (slot, item) in array.iter_mut().zip(items) {
                            *slot = unbox::<T>(item)?;
                        }
                        Ok(())
                    },
                },
            ))
        })
    }
}

impl<T: JsonType + Default> JsonType for Box<[T]> {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::of::<Self>()
                .with_is_default(|v| v.downcast_ref::<Self>().is_some_and(|s| s.is_empty()))
                .with_ordered(SeqInfo::new::<T>(
                    |v| Ok(downcast_ref::<Self>(v)?.len()),
                    |v| Ok(Box::new(downcast_ref::<Self>(v)?.iter().map(|x| x as &dyn Any))),
                    SeqFill::Collect {
                        len: None,
                        assign: |v, items| {
                            *downcast_mut::<Self>(v)? = collect::<Vec<T>, T>(items)?.into_boxed_slice();
                            Ok(())
                        },
                    },
                ))
        })
    }
}

macro_rules! impl_set {
    ($ty:ty, [$($bound:tt)*] $(, $hasher:ident)?) => {
        impl<T: JsonType + Default + $($bound)* $(, $hasher)?> JsonType for $ty
        $(where $hasher: BuildHasher + Default + Send + Sync + 'static)?
        {
            fn descriptor() -> &'static TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeDescriptor::of::<Self>()
                        .with_is_default(|v| v.downcast_ref::<Self>().is_some_and(|s| s.is_empty()))
                        .with_ordered(SeqInfo::new::<T>(
                            |v| Ok(downcast_ref::<Self>(v)?.len()),
                            |v| Ok(Box::new(downcast_ref::<Self>(v)?.iter().map(|x| x as &dyn Any))),
                            SeqFill::Collect {
                                len: None,
                                assign: |v, items| {
                                    *downcast_mut::<Self>(v)? = collect::<Self, T>(items)?;
                                    Ok(())
                                },
                            },
                        ))
                })
            }
        }
    };
}

impl_set!(HashSet<T, S>, [Eq + Hash], S);
impl_set!(hashbrown::HashSet<T, S>, [Eq + Hash], S);
impl_set!(BTreeSet<T>, [Ord]);
