#![forbid(unsafe_code)]

//! Subject-location tracking
//!
//! A [`Path`] is the root-to-node address of the value currently under test,
//! maintained as an explicit stack of key/index segments. Every recursive step
//! of the evaluator pushes exactly one segment and pops it on return, so
//! sibling branches never observe each other's position.

use serde_json::Value;
use std::fmt;

/// One step from a container to a child: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object member key
    Key(String),
    /// Array element index
    Index(usize),
}

impl Segment {
    /// Renders the segment as a JSON value (string for keys, number for indices)
    pub fn to_value(&self) -> Value {
        match self {
            Segment::Key(k) => Value::String(k.clone()),
            Segment::Index(i) => Value::from(*i),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "{}", k),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Stack-discipline chain of segments identifying the current subject location
///
/// The root path is empty. `push`/`pop` must be strictly paired; the evaluator
/// wraps every descent in them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Creates an empty path addressing the document root
    pub fn root() -> Self {
        Path::default()
    }

    /// Pushes a segment, descending into a child
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Pops the most recent segment, returning to the parent
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Returns the segments from root to the current node
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the key of the object entry currently being visited, if the
    /// innermost segment is a key
    pub fn current_key(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Key(k)) => Some(k.as_str()),
            _ => None,
        }
    }

}

/// Pointer-style rendering of a segment chain: `/aaa/0/bbb`, or `/` for the
/// root
pub(crate) fn render_pointer(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for seg in segments {
        out.push('/');
        out.push_str(&seg.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_pop_discipline() {
        let mut path = Path::root();
        assert!(path.segments().is_empty());

        path.push(Segment::Key("aaa".to_string()));
        path.push(Segment::Index(3));
        assert_eq!(
            path.segments(),
            &[Segment::Key("aaa".to_string()), Segment::Index(3)]
        );

        path.pop();
        assert_eq!(path.segments(), &[Segment::Key("aaa".to_string())]);
        path.pop();
        assert!(path.segments().is_empty());
    }

    #[test]
    fn test_current_key() {
        let mut path = Path::root();
        assert_eq!(path.current_key(), None);

        path.push(Segment::Key("k".to_string()));
        assert_eq!(path.current_key(), Some("k"));

        path.push(Segment::Index(0));
        assert_eq!(path.current_key(), None);
    }

    #[test]
    fn test_segment_rendering() {
        assert_eq!(Segment::Key("items".to_string()).to_value(), json!("items"));
        assert_eq!(Segment::Index(2).to_value(), json!(2));
        assert_eq!(Segment::Index(2).to_string(), "2");
    }

    #[test]
    fn test_render_pointer() {
        assert_eq!(render_pointer(&[]), "/");
        assert_eq!(
            render_pointer(&[Segment::Key("items".to_string()), Segment::Index(2)]),
            "/items/2"
        );
    }
}
