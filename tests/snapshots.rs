//! Snapshot tests for the rendered shape trees

use logshape::shape::formats::result_to_treeviz_str;
use logshape::shape::{parse_line, InputLine};

fn treeviz(line: &str) -> String {
    result_to_treeviz_str(InputLine::new(line), &parse_line(line))
}

#[test]
fn semicolon_fields_tree() {
    insta::assert_snapshot!(treeviz("name: bob; age: 42").trim_end(), @r"
    ├─ pair: name: bob
    │ ├─ key: name
    │ │ └─ word: name
    │ └─ val: bob
    │   └─ word: bob
    └─ pair: age: 42
      ├─ key: age
      │ └─ word: age
      └─ val: 42
        └─ num: 42
    ");
}

#[test]
fn bare_list_tree() {
    insta::assert_snapshot!(treeviz("(1, 2, 3)").trim_end(), @r"
    └─ pair: 1, 2, 3
      ├─ key: ∅
      └─ grp: 1, 2, 3
        ├─ pair: 1
        │ ├─ key: ∅
        │ └─ num: 1
        ├─ pair: 2
        │ ├─ key: ∅
        │ └─ num: 2
        └─ pair: 3
          ├─ key: ∅
          └─ num: 3
    ");
}
