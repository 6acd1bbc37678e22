//! Growing an axis when a write names a label it does not have.

use crate::config::IndexOpts;
use crate::error::IndexError;
use crate::label::Label;
use crate::labels::LabelSet;
use crate::labels::Loc;
use crate::policy::Policy;
use crate::selector::Selector;
use crate::storage::Storage;

/// A write asked for `label` on `axis`, which lacks it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnlargementRequest {
    pub axis: usize,
    pub label: Label,
}

/// Appends missing write keys to an axis.
#[derive(Debug, Clone)]
pub struct AxisEnlarger<'a> {
    policy: Policy,
    opts: &'a IndexOpts,
}

impl<'a> AxisEnlarger<'a> {
    pub fn new(policy: Policy, opts: &'a IndexOpts) -> Self {
        Self { policy, opts }
    }

    /// The enlargement `selectors` call for, if any. At most one axis
    /// may grow per write.
    pub fn request(&self, selectors: &[Selector]) -> Result<Option<EnlargementRequest>, IndexError> {
        let mut missing = selectors
            .iter()
            .enumerate()
            .filter_map(|(axis, s)| s.as_missing_key().map(|label| (axis, label)));
        let Some((axis, label)) = missing.next() else {
            return Ok(None);
        };
        let mut axes = vec![axis];
        axes.extend(missing.map(|(axis, _)| axis));
        if axes.len() > 1 || self.policy == Policy::Position || !self.opts.allow_enlargement {
            return Err(IndexError::CannotEnlarge {
                policy: self.policy,
                axes,
            });
        }
        Ok(Some(EnlargementRequest {
            axis,
            label: label.clone(),
        }))
    }

    /// `labels` with `label` appended, and the position it landed at.
    pub fn enlarge(&self, labels: &LabelSet, axis: usize, label: &Label) -> Result<(LabelSet, usize), IndexError> {
        let grown = labels.append(label.clone());
        match grown.get_loc(label) {
            Some(Loc::Position(p)) => Ok((grown, p)),
            _ => Err(IndexError::CannotEnlarge {
                policy: self.policy,
                axes: vec![axis],
            }),
        }
    }

    /// A copy of `target` grown by `request`, with the new entry
    /// filled, and the new entry's position.
    pub fn apply<S: Storage>(&self, target: &S, request: &EnlargementRequest) -> Result<(S, usize), IndexError> {
        let labels = target.get_axis(request.axis);
        let (grown, position) = self.enlarge(labels, request.axis, &request.label)?;
        let indexer: Vec<Option<usize>> = (0..labels.len()).map(Some).chain([None]).collect();
        let enlarged = target.reindex_indexer(grown, &indexer, request.axis, &self.opts.fill)?;
        tracing::debug!(
            axis = request.axis,
            label = %request.label,
            position,
            "enlarged axis"
        );
        Ok((enlarged, position))
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::frame::Frame;
    use crate::label::LabelDtype;
    use crate::label::Value;
    use crate::labels;

    #[test]
    fn test_request() {
        let opts = IndexOpts::lenient();
        let enlarger = AxisEnlarger::new(Policy::Label, &opts);
        assert_eq!(enlarger.request(&[Selector::full()]).unwrap(), None);
        assert_eq!(
            enlarger
                .request(&[Selector::full(), Selector::MissingKey("z".into())])
                .unwrap(),
            Some(EnlargementRequest {
                axis: 1,
                label: "z".into()
            })
        );
        assert!(matches!(
            enlarger.request(&[Selector::MissingKey("a".into()), Selector::MissingKey("z".into())]),
            Err(IndexError::CannotEnlarge { axes, .. }) if axes == vec![0, 1]
        ));

        let strict = IndexOpts::strict();
        assert!(matches!(
            AxisEnlarger::new(Policy::Legacy, &strict).request(&[Selector::MissingKey("z".into())]),
            Err(IndexError::CannotEnlarge { policy: Policy::Legacy, .. })
        ));
    }

    #[test]
    fn test_enlarge_widens() {
        let opts = IndexOpts::lenient();
        let enlarger = AxisEnlarger::new(Policy::Label, &opts);
        let floats = LabelSet::with_dtype(vec![0.5.into(), 1.5.into()], LabelDtype::Float64);
        let (grown, position) = enlarger.enlarge(&floats, 0, &3.into()).unwrap();
        assert_eq!(position, 2);
        assert_eq!(grown.dtype(), LabelDtype::Float64);
        assert_eq!(grown.get(2), Some(&Label::Float(3.0)));

        let (grown, _) = enlarger.enlarge(&labels![1, 2], 0, &"x".into()).unwrap();
        assert_eq!(grown.dtype(), LabelDtype::Object);
    }

    #[traced_test]
    #[test]
    fn test_apply() {
        let opts = IndexOpts::lenient();
        let frame = Frame::table(labels!["a", "b"], labels!["x"], vec![vec![1], vec![2]]).unwrap();
        let request = EnlargementRequest {
            axis: 0,
            label: "c".into(),
        };
        let (enlarged, position) = AxisEnlarger::new(Policy::Legacy, &opts)
            .apply(&frame, &request)
            .unwrap();
        assert_eq!(position, 2);
        assert_eq!(enlarged.get_axis(0), &labels!["a", "b", "c"]);
        assert_eq!(
            enlarged.values(),
            &[Value::Int(1), Value::Int(2), Value::Null]
        );
        assert_eq!(frame.shape(), vec![2, 1]);
        assert!(logs_contain("enlarged axis"));
    }
}
