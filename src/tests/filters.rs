use super::*;

const SKU: &[u8] = br#"{"sku":[{"id":1,"name":"Bicycle","price":160,"extras":["flashlight","pump"]},{"id":2,"name":"Scooter","price":280,"extras":["helmet","gloves","spare wheel"]}]}"#;

#[test]
fn numeric_comparison() {
    assert_eq!(
        get_str(SKU, "$.sku[?(@.price > 200)].name").as_ref(),
        br#"["Scooter"]"#
    );
    assert_eq!(
        get_str(SKU, "$.sku[?(@.price <= 160)].name").as_ref(),
        br#"["Bicycle"]"#
    );
    assert_eq!(get_str(SKU, "$.sku[?(@.price > 500)].name").as_ref(), b"[]");
}

#[test]
fn function_inside_filter() {
    assert_eq!(
        get_str(SKU, "$.sku[?(@.extras.count() < 3)].name").as_ref(),
        br#"["Bicycle"]"#
    );
    assert_eq!(
        get_str(SKU, "$.sku[?(@.extras.count() == 3)].id").as_ref(),
        b"[2]"
    );
}

#[test]
fn filter_without_successor_returns_elements() {
    let out = get_str(SKU, "$.sku[?(@.id == 2)]");
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v[0]["name"], "Scooter");
}

#[test]
fn root_relative_operand_is_resolved_once() {
    let doc = br#"{"store":{"book":[{"price":8.95,"title":"A"},{"price":22.99,"title":"B"}]},"expensive":10}"#;
    assert_eq!(
        get_str(doc, "$.store.book[?(@.price > $.expensive)].title").as_ref(),
        br#"["B"]"#
    );
    // nested root operands work the same way
    assert_eq!(
        get_str(doc, "$.store.book[?(@.price < $.expensive)].title").as_ref(),
        br#"["A"]"#
    );
    // a missing root operand matches nothing instead of failing
    assert_eq!(
        get_str(doc, "$.store.book[?(@.price > $.nope)].title").as_ref(),
        b"[]"
    );
}

#[test]
fn logical_operators_and_precedence() {
    // && binds tighter than ||
    assert_eq!(
        get_str(SKU, "$.sku[?(@.id == 1 || @.id == 2 && @.price > 500)].name").as_ref(),
        br#"["Bicycle"]"#
    );
    // parentheses override
    assert_eq!(
        get_str(SKU, "$.sku[?((@.id == 1 || @.id == 2) && @.price > 500)].name").as_ref(),
        b"[]"
    );
    assert_eq!(
        get_str(SKU, "$.sku[?(@.price >= 160 && @.price < 200)].name").as_ref(),
        br#"["Bicycle"]"#
    );
}

#[test]
fn short_circuit_skips_missing_operands() {
    // both operands missing: falsy, never an error
    assert_eq!(get_str(SKU, "$.sku[?(@.nope && @.also)].id").as_ref(), b"[]");
    assert_eq!(
        get_str(SKU, "$.sku[?(@.id == 1 || @.nope)].id").as_ref(),
        b"[1]"
    );
}

#[test]
fn bare_subpath_tests_existence() {
    let doc = br#"{"a":[{"x":1},{"y":2},{"x":null},{"x":false}]}"#;
    // existence, not truthiness: explicit null and false both count
    assert_eq!(
        get_str(doc, "$.a[?(@.x)]").as_ref(),
        br#"[{"x":1},{"x":null},{"x":false}]"#
    );
}

#[test]
fn regex_match_with_flag() {
    let doc = br#"{"books":[{"t":"Moby Dick"},{"t":"Emma"}]}"#;
    assert_eq!(
        get_str(doc, "$.books[?(@.t =~ /dick/i)].t").as_ref(),
        br#"["Moby Dick"]"#
    );
    // without the flag the case must match exactly
    assert_eq!(get_str(doc, "$.books[?(@.t =~ /dick/)].t").as_ref(), b"[]");
    assert_eq!(
        get_str(doc, "$.books[?(@.t =~ /^Em+a$/)].t").as_ref(),
        br#"["Emma"]"#
    );
}

#[test]
fn regex_on_non_string_is_an_error() {
    let doc = br#"{"a":[{"v":1}]}"#;
    assert_eq!(
        get(doc, "$.a[?(@.v =~ /1/)]"),
        Err(SliceError::InvalidRegexp)
    );
}

#[test]
fn string_equality_is_byte_for_byte() {
    let doc = br#"{"books":[{"t":"Emma"},{"t":"emma"}]}"#;
    assert_eq!(
        get_str(doc, "$.books[?(@.t == 'Emma')]").as_ref(),
        br#"[{"t":"Emma"}]"#
    );
    // escapes are left unprocessed on both sides
    let doc = br#"{"a":[{"t":"x\"y"}]}"#;
    assert_eq!(
        get_str(doc, r#"$.a[?(@.t == 'x\"y')]"#).as_ref(),
        br#"[{"t":"x\"y"}]"#
    );
}

#[test]
fn ordered_comparison_of_strings_is_rejected() {
    let doc = br#"{"books":[{"t":"Emma"}]}"#;
    assert_eq!(
        get(doc, "$.books[?(@.t > 'A')]"),
        Err(SliceError::OperatorNotApplicableToStrings)
    );
}

#[test]
fn ordered_comparison_of_mixed_kinds_is_rejected() {
    let doc = br#"{"a":[{"v":true}]}"#;
    assert_eq!(
        get(doc, "$.a[?(@.v > 1)]"),
        Err(SliceError::OperandTypesMismatch)
    );
}

#[test]
fn mismatched_kinds_compare_false_both_ways() {
    let doc = br#"{"a":[{"v":1},{"v":"1"}]}"#;
    assert_eq!(get_str(doc, "$.a[?(@.v == 1)]").as_ref(), br#"[{"v":1}]"#);
    assert_eq!(get_str(doc, "$.a[?(@.v == '1')]").as_ref(), br#"[{"v":"1"}]"#);
    // kind mismatch yields false for != as well, so only same-kind
    // non-equal values would survive; here there are none
    assert_eq!(get_str(doc, "$.a[?(@.v != 1)]").as_ref(), b"[]");
}

#[test]
fn null_compares_equal_only_to_null() {
    let doc = br#"{"a":[{"v":null},{"v":1},{}]}"#;
    assert_eq!(get_str(doc, "$.a[?(@.v == null)]").as_ref(), br#"[{"v":null}]"#);
    // a missing field is not an explicit null
    assert_eq!(get_str(doc, "$.a[?(@.v != null)]").as_ref(), br#"[{"v":1}]"#);
}

#[test]
fn boolean_literals() {
    let doc = br#"{"a":[{"ok":true},{"ok":false}]}"#;
    assert_eq!(get_str(doc, "$.a[?(@.ok == true)]").as_ref(), br#"[{"ok":true}]"#);
    assert_eq!(get_str(doc, "$.a[?(@.ok != true)]").as_ref(), br#"[{"ok":false}]"#);
}

#[test]
fn arithmetic_in_comparisons() {
    let doc = br#"{"a":[{"p":5,"q":2},{"p":1,"q":10}]}"#;
    assert_eq!(
        get_str(doc, "$.a[?(@.p * 2 > @.q)].p").as_ref(),
        b"[5]"
    );
    assert_eq!(
        get_str(doc, "$.a[?(@.q / @.p >= 10)].p").as_ref(),
        b"[1]"
    );
    assert_eq!(
        get_str(doc, "$.a[?(@.p + 1 == 2)].p").as_ref(),
        b"[1]"
    );
    assert_eq!(
        get_str(doc, "$.a[?(@.q - @.p == 3)].p").as_ref(),
        b"[5]"
    );
}

#[test]
fn arithmetic_on_non_numbers_is_an_error() {
    let doc = br#"{"a":[{"p":1,"r":"x"}]}"#;
    assert_eq!(
        get(doc, "$.a[?(@.p + @.r > 1)]"),
        Err(SliceError::InvalidArithmetic)
    );
}

#[test]
fn arithmetic_with_missing_operand_is_no_match() {
    let doc = br#"{"a":[{"p":1}]}"#;
    assert_eq!(get_str(doc, "$.a[?(@.p + @.r > 1)]").as_ref(), b"[]");
}

#[test]
fn whole_element_comparison() {
    let doc = b"[5,\"5\",5]";
    assert_eq!(get_str(doc, "$[?(@ == 5)]").as_ref(), b"[5,5]");
    assert_eq!(get_str(doc, "$[?(@ == '5')]").as_ref(), br#"["5"]"#);
}

#[test]
fn nodes_compare_by_byte_equality() {
    let doc = br#"[{"v":{"x":1},"w":{"x":1}},{"v":{"x":1},"w":{"x":2}}]"#;
    let out = get_str(doc, "$[?(@.v == @.w)]");
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 1);
    assert_eq!(v[0]["w"]["x"], 1);

    let out = get_str(doc, "$[?(@.v != @.w)]");
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v[0]["w"]["x"], 2);
}

#[test]
fn filter_on_object_root_is_rejected() {
    let doc = br#"{"t":"Moby Dick"}"#;
    assert_eq!(
        get(doc, "$[?(@.t =~ /dick/i)]"),
        Err(SliceError::ArrayExpected)
    );
}

#[test]
fn nested_subpath_with_index() {
    let doc = br#"{"a":[{"xs":[1,2]},{"xs":[3]}]}"#;
    assert_eq!(get_str(doc, "$.a[?(@.xs[0] > 1)].xs").as_ref(), b"[[3]]");
}
