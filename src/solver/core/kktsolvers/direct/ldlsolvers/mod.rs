pub mod qdldl;
