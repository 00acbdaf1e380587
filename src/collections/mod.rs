//! Collection codecs.
//!
//! | Codec | Type | Count source | Bulk path |
//! |-------|------|--------------|-----------|
//! | [`ListFormatter`] | `Vec<T>` | `len()` | no; decodes in place when lengths match |
//! | [`StackFormatter`] | [`Stack<T>`] | `len()` | no; top-to-bottom order |
//! | [`CollectionFormatter`] | `Box<[T]>`, any [`ReadOnlyCollection`] | `len()` | yes, contiguous + blittable |
//! | [`IterableFormatter`] | any `IntoIterator` | exact `size_hint`, else staging | no |
//! | [`QueueFormatter`] | `VecDeque<T>` | `len()` | no; front-to-back order |
//! | [`MapFormatter`] | `HashMap<K, V, S>` | `len()` | no |
//! | [`SetFormatter`] | `HashSet<T, S>` | `len()` | no |
//! | [`PairFormatter`] | `(K, V)` | arity 2 | yes, when K and V are blittable |
//!
//! Every container codec is registered for both the plain type and its
//! `Option<_>` form.  `None` is written as a null header; decoding a null
//! header into the plain type fails with `UnexpectedNull`.

mod collection;
mod iterable;
mod list;
mod map;
mod pair;
mod queue;
mod stack;

pub use collection::{CollectionFormatter, ReadOnlyCollection};
pub use iterable::IterableFormatter;
pub use list::ListFormatter;
pub use map::{MapFormatter, SetFormatter};
pub use pair::{PairFormatter, PAIR_ARITY};
pub use queue::QueueFormatter;
pub use stack::{Stack, StackFormatter};
