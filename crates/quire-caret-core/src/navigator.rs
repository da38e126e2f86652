//! Arrow-key entry point.
//!
//! Browsers lose track of the column when ArrowUp/ArrowDown crosses between
//! wrapped paragraphs inside a flex container. [`LineNavigator`] takes over
//! in exactly that situation: the caret is on the first (or last) row of its
//! paragraph and the key would leave it. Everywhere else it steps aside and
//! the browser's default handling stands.
//!
//! A key press runs through these stages, any of which may stop the pass:
//!
//! 1. `KeyFiltered`: only ArrowUp/ArrowDown continue
//! 2. `ContainerValidated`: the event target has `display: flex`
//! 3. `SelectionCaptured`: there is a selection anchored in a text node
//! 4. `IndexResolved`: the anchor maps to a flat index in its paragraph
//! 5. `BoundaryChecked`: the caret is on the paragraph's edge row
//! 6. `TargetLocated`: the adjacent paragraph has a landing position
//! 7. `Applied`: the live selection is collapsed there
//!
//! The live selection is written at most once, at the very end.

use crate::boundary::analyze;
use crate::closest::locate_closest;
use crate::config::NavigatorConfig;
use crate::dom::{CaretDom, NodeKind, SelectionAccess};
use crate::error::{NavSkip, NavStage};
use crate::translate::flatten;
use crate::types::{CaretAnchor, Direction};

/// Result of handling one key press.
#[derive(Clone, Debug, PartialEq)]
pub enum NavOutcome<N> {
    /// The caret moved; the caller must suppress the default action.
    Moved(CaretAnchor<N>),
    /// Nothing was touched.
    Skipped {
        /// Last stage completed before stopping.
        stage: NavStage,
        reason: NavSkip,
    },
}

impl<N> NavOutcome<N> {
    /// Whether the key event's default action should be prevented.
    pub fn should_prevent_default(&self) -> bool {
        matches!(self, NavOutcome::Moved(_))
    }

    pub fn skip_reason(&self) -> Option<&NavSkip> {
        match self {
            NavOutcome::Moved(_) => None,
            NavOutcome::Skipped { reason, .. } => Some(reason),
        }
    }
}

/// Cross-paragraph caret navigation for flex-laid-out editable regions.
#[derive(Clone, Debug, Default)]
pub struct LineNavigator {
    config: NavigatorConfig,
}

impl LineNavigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Handle a key press whose event target is `target`.
    pub fn handle_key<D, S>(
        &self,
        dom: &D,
        selection: &mut S,
        key: &str,
        target: &D::Node,
    ) -> NavOutcome<D::Node>
    where
        D: CaretDom,
        S: SelectionAccess<D::Node>,
    {
        let mut stage = NavStage::Idle;
        match self.navigate(dom, selection, key, target, &mut stage) {
            Ok(anchor) => {
                tracing::debug!(
                    target: "quire::caret",
                    key,
                    offset = anchor.offset,
                    "moved caret to adjacent paragraph"
                );
                NavOutcome::Moved(anchor)
            }
            Err(reason) => {
                if stage > NavStage::Idle {
                    tracing::debug!(target: "quire::caret", key, ?stage, %reason, "line navigation skipped");
                }
                NavOutcome::Skipped { stage, reason }
            }
        }
    }

    fn navigate<D, S>(
        &self,
        dom: &D,
        selection: &mut S,
        key: &str,
        target: &D::Node,
        stage: &mut NavStage,
    ) -> Result<CaretAnchor<D::Node>, NavSkip>
    where
        D: CaretDom,
        S: SelectionAccess<D::Node>,
    {
        let direction = Direction::from_key(key).ok_or(NavSkip::NotNavigationKey)?;
        *stage = NavStage::KeyFiltered;

        let display = dom.computed_display(target);
        if display.as_deref() != Some(self.config.flex_display.as_str()) {
            return Err(NavSkip::NotFlexContainer { display });
        }
        *stage = NavStage::ContainerValidated;

        let anchor = selection.anchor().ok_or(NavSkip::NoSelection)?;
        match (dom.kind(&anchor.node), direction) {
            (NodeKind::Text, _) => {}
            // TODO: element anchors on ArrowDown could map to the flat index
            // of the anchored child; left alone until a host reports one.
            (NodeKind::Element, Direction::Down) => return Err(NavSkip::ElementAnchorUnhandled),
            (kind, _) => return Err(NavSkip::UnsupportedAnchor(kind)),
        }
        *stage = NavStage::SelectionCaptured;

        let paragraph = self
            .enclosing_paragraph(dom, &anchor.node, target)
            .ok_or(NavSkip::NoParagraph)?;
        let index = flatten(dom, &anchor, &paragraph).ok_or(NavSkip::Unflattenable)?;
        *stage = NavStage::IndexResolved;

        let boundary = analyze(dom, direction, &paragraph, index, &self.config)?;
        if !boundary.on_boundary {
            return Err(NavSkip::NotOnBoundaryLine);
        }
        *stage = NavStage::BoundaryChecked;

        let adjacent = match direction {
            Direction::Up => dom.previous_element_sibling(&paragraph),
            Direction::Down => dom.next_element_sibling(&paragraph),
        }
        .ok_or(NavSkip::NoAdjacentParagraph)?;
        let landing = locate_closest(dom, direction, &adjacent, boundary.current_x, &self.config)?;
        *stage = NavStage::TargetLocated;

        selection.collapse(&landing)?;
        *stage = NavStage::Applied;
        Ok(landing)
    }

    /// Nearest ancestor-or-self of `node` with the paragraph tag, without
    /// climbing past `container`.
    fn enclosing_paragraph<D: CaretDom>(
        &self,
        dom: &D,
        node: &D::Node,
        container: &D::Node,
    ) -> Option<D::Node> {
        let mut current = node.clone();
        loop {
            if current == *container {
                return None;
            }
            if dom.kind(&current) == NodeKind::Element
                && dom.tag_name(&current).as_deref() == Some(self.config.paragraph_tag.as_str())
            {
                return Some(current);
            }
            current = dom.parent(&current)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDom, MockSelection, NodeId};
    use crate::translate::locate;

    struct Fixture {
        dom: MockDom,
        container: NodeId,
        paragraphs: Vec<NodeId>,
    }

    /// A flex container holding one paragraph per entry, 10 columns wide.
    fn fixture(texts: &[&str]) -> Fixture {
        let dom = MockDom::new(10);
        let container = dom.element("div", dom.root());
        dom.set_display(container, "flex");
        let paragraphs = texts
            .iter()
            .map(|text| {
                let para = dom.element("p", container);
                dom.text_node(text, para);
                para
            })
            .collect();
        Fixture {
            dom,
            container,
            paragraphs,
        }
    }

    impl Fixture {
        fn caret(&self, para: usize, index: usize) -> MockSelection {
            let anchor = locate(&self.dom, &self.paragraphs[para], index).unwrap();
            MockSelection::at(anchor)
        }

        fn press(&self, selection: &mut MockSelection, key: &str) -> NavOutcome<NodeId> {
            LineNavigator::default().handle_key(&self.dom, selection, key, &self.container)
        }

        fn flat(&self, para: usize, selection: &MockSelection) -> Option<usize> {
            flatten(&self.dom, selection.anchor.as_ref()?, &self.paragraphs[para])
        }
    }

    const LONG: &str = "abcdefghijklmnopqrstuvwxy";

    #[test]
    fn test_down_from_last_row() {
        let fx = fixture(&[LONG, LONG]);
        let mut selection = fx.caret(0, 23);

        let outcome = fx.press(&mut selection, "ArrowDown");
        assert!(outcome.should_prevent_default());
        assert_eq!(selection.collapse_count, 1);
        assert_eq!(fx.flat(1, &selection), Some(3));
    }

    #[test]
    fn test_up_from_first_row() {
        let fx = fixture(&[LONG, LONG]);
        let mut selection = fx.caret(1, 3);

        let outcome = fx.press(&mut selection, "ArrowUp");
        assert!(matches!(outcome, NavOutcome::Moved(_)));
        assert_eq!(fx.flat(0, &selection), Some(23));
    }

    #[test]
    fn test_up_then_down_returns_to_original_row() {
        let fx = fixture(&[LONG, LONG]);
        let mut selection = fx.caret(1, 7);

        assert!(fx.press(&mut selection, "ArrowUp").should_prevent_default());
        assert!(fx.press(&mut selection, "ArrowDown").should_prevent_default());
        // Up lands at the end of the shorter last row, so the column the
        // caret comes back with is that row's end (x = 50), not 70.
        let index = fx.flat(1, &selection).unwrap();
        assert!(index < 10, "landed at {index}, off the first row");
        assert_eq!(index, 5);
    }

    #[test]
    fn test_down_from_end_of_text() {
        let fx = fixture(&[LONG, LONG]);
        let mut selection = fx.caret(0, 25);

        // Right edge of 'y' is 50, which is the left edge of index 5.
        assert!(fx.press(&mut selection, "ArrowDown").should_prevent_default());
        assert_eq!(fx.flat(1, &selection), Some(5));
    }

    #[test]
    fn test_not_on_boundary_row() {
        let fx = fixture(&[LONG, LONG]);
        let mut selection = fx.caret(0, 13);
        let before = selection.anchor.clone();

        let outcome = fx.press(&mut selection, "ArrowDown");
        assert_eq!(
            outcome,
            NavOutcome::Skipped {
                stage: NavStage::IndexResolved,
                reason: NavSkip::NotOnBoundaryLine,
            }
        );
        assert!(!outcome.should_prevent_default());
        assert_eq!(selection.anchor, before);
        assert_eq!(selection.collapse_count, 0);
    }

    #[test]
    fn test_other_keys_never_touch_selection() {
        let fx = fixture(&[LONG, LONG]);
        for key in ["ArrowLeft", "ArrowRight", "Enter", "a", "PageDown", "Home"] {
            let mut selection = fx.caret(0, 23);
            let outcome = fx.press(&mut selection, key);
            assert_eq!(outcome.skip_reason(), Some(&NavSkip::NotNavigationKey));
            assert!(!outcome.should_prevent_default());
            assert_eq!(selection.collapse_count, 0);
        }
        assert_eq!(fx.dom.children(&fx.container), fx.paragraphs);
    }

    #[test]
    fn test_requires_flex_container() {
        let fx = fixture(&[LONG, LONG]);
        fx.dom.set_display(fx.container, "block");
        let mut selection = fx.caret(0, 23);

        let outcome = fx.press(&mut selection, "ArrowDown");
        assert_eq!(
            outcome.skip_reason(),
            Some(&NavSkip::NotFlexContainer {
                display: Some("block".into())
            })
        );
        assert_eq!(selection.collapse_count, 0);
    }

    #[test]
    fn test_no_selection() {
        let fx = fixture(&[LONG]);
        let mut selection = MockSelection::default();
        let outcome = fx.press(&mut selection, "ArrowUp");
        assert_eq!(outcome.skip_reason(), Some(&NavSkip::NoSelection));
    }

    #[test]
    fn test_element_anchor() {
        let fx = fixture(&[LONG, LONG]);

        let mut up = MockSelection::at(CaretAnchor::new(fx.paragraphs[1], 0));
        assert_eq!(
            fx.press(&mut up, "ArrowUp").skip_reason(),
            Some(&NavSkip::UnsupportedAnchor(NodeKind::Element))
        );

        let mut down = MockSelection::at(CaretAnchor::new(fx.paragraphs[0], 0));
        assert_eq!(
            fx.press(&mut down, "ArrowDown").skip_reason(),
            Some(&NavSkip::ElementAnchorUnhandled)
        );
        assert_eq!(up.collapse_count + down.collapse_count, 0);
    }

    #[test]
    fn test_document_edges() {
        let fx = fixture(&[LONG, LONG]);

        let mut top = fx.caret(0, 2);
        assert_eq!(
            fx.press(&mut top, "ArrowUp"),
            NavOutcome::Skipped {
                stage: NavStage::BoundaryChecked,
                reason: NavSkip::NoAdjacentParagraph,
            }
        );

        let mut bottom = fx.caret(1, 22);
        assert_eq!(
            fx.press(&mut bottom, "ArrowDown").skip_reason(),
            Some(&NavSkip::NoAdjacentParagraph)
        );
    }

    #[test]
    fn test_caret_outside_paragraph() {
        let fx = fixture(&[LONG]);
        let loose = fx.dom.text_node("loose text", fx.container);
        let mut selection = MockSelection::at(CaretAnchor::new(loose, 2));
        assert_eq!(
            fx.press(&mut selection, "ArrowDown").skip_reason(),
            Some(&NavSkip::NoParagraph)
        );
    }

    #[test]
    fn test_empty_target_paragraph() {
        let fx = fixture(&["abc", ""]);
        let mut selection = fx.caret(0, 1);
        assert_eq!(
            fx.press(&mut selection, "ArrowDown").skip_reason(),
            Some(&NavSkip::NoTargetPosition)
        );
        assert_eq!(selection.collapse_count, 0);
    }

    #[test]
    fn test_collapse_failure_is_absorbed() {
        let fx = fixture(&[LONG, LONG]);
        let mut selection = fx.caret(0, 23);
        selection.fail_collapse = true;
        let outcome = fx.press(&mut selection, "ArrowDown");
        assert!(matches!(outcome.skip_reason(), Some(NavSkip::Dom(_))));
        assert!(!outcome.should_prevent_default());
    }

    #[test]
    fn test_no_measurement_leftovers() {
        let fx = fixture(&[LONG, "", LONG]);
        let cases = [
            (0, 23, "ArrowDown"),
            (0, 2, "ArrowUp"),
            (0, 13, "ArrowDown"),
            (2, 4, "ArrowUp"),
            (2, 24, "ArrowDown"),
        ];
        for (para, index, key) in cases {
            let mut selection = fx.caret(para, index);
            fx.press(&mut selection, key);
            assert_eq!(fx.dom.count_class("quire-caret-marker"), 0);
            assert_eq!(fx.dom.children(&fx.container), fx.paragraphs);
        }
    }

    #[test]
    fn test_nested_markup_landing() {
        let fx = fixture(&[LONG]);
        let para = fx.dom.element("p", fx.container);
        fx.dom.text_node("ab", para);
        let em = fx.dom.element("em", para);
        let em_text = fx.dom.text_node("cdef", em);

        let mut selection = fx.caret(0, 24);
        assert!(fx.press(&mut selection, "ArrowDown").should_prevent_default());
        assert_eq!(selection.anchor, Some(CaretAnchor::new(em_text, 2)));
    }
}
