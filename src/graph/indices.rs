use core::fmt;

/// Identifier of a mesh vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VertexI(pub usize);

/// Identifier of an undirected edge. Doubled edges carry their own id, so
/// two distinct ids may connect the same pair of vertices.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeI(pub usize);

/// Identifier of a face of the embedding.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FaceI(pub usize);

macro_rules! index_impls {
    ($t:ident, $prefix:expr) => {
        impl From<usize> for $t {
            fn from(n: usize) -> Self {
                $t(n)
            }
        }
        impl From<$t> for usize {
            fn from(i: $t) -> usize {
                i.0
            }
        }
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
        impl fmt::Debug for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

index_impls!(VertexI, "v");
index_impls!(EdgeI, "e");
index_impls!(FaceI, "f");
