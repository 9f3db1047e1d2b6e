/// Dimension of the sentence embeddings stored on findings.
pub const EMBEDDING_DIMENSION: usize = 384;

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn zeros(dimensions: usize) -> Self {
        Self {
            values: vec![0.0; dimensions],
        }
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Text form accepted by a pgvector `vector` column, e.g. `[0.1,0.2]`.
    pub fn to_vector_literal(&self) -> String {
        let joined = self
            .values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("[{}]", joined)
    }

    /// Parses the text form produced by `to_vector_literal` or by casting a
    /// pgvector column to text.
    pub fn from_vector_literal(literal: &str) -> Option<Self> {
        let inner = literal.trim().strip_prefix('[')?.strip_suffix(']')?;
        if inner.trim().is_empty() {
            return Some(Self::new(Vec::new()));
        }
        inner
            .split(',')
            .map(|v| v.trim().parse::<f32>().ok())
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }
}
