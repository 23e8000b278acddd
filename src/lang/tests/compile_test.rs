use std::collections::HashMap;
use crate::{compile,compile_to_json};
use crate::lang::compiler::Compiler;
use crate::lang::settings::Settings;

fn no_libs() -> HashMap<String,String> {
    HashMap::new()
}

/// every successful block is even-length uppercase hex
fn assert_wellformed(hex_str: &str) {
    hex::decode(hex_str).expect("hex error");
    assert!(hex_str.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
}

mod whole_programs {
    use super::*;

    #[test]
    fn literal_block() {
        let blocks = compile("@block.a: de ad be ef @end",&no_libs()).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"DEADBEEF");
        assert_wellformed(blocks.get("a").expect("missing block"));
    }
    #[test]
    fn placeholder_digit() {
        let blocks = compile("@block.a: @x=f xx xa @end",&no_libs()).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"FFFA");
    }
    #[test]
    fn constant_expansion() {
        let blocks = compile("def $z { aa bb } @block.a: $z cc @end",&no_libs()).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"AABBCC");
    }
    #[test]
    fn hygienic_labels_in_repeated_macro_calls() {
        let blocks = compile("def *p(a) { @adr.&_L_& %_a_% } @block.x: *p(aa) *p(bb) @end",&no_libs()).expect("compile error");
        assert_eq!(blocks.get("x").expect("missing block"),"AABB");
    }
    #[test]
    fn label_arithmetic_with_endian_swap() {
        let blocks = compile("@block.a: @offset=1000 @adr.s aa bb [#s+<0002>] @end",&no_libs()).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"AABB0210");
    }
    #[test]
    fn overwrite_patch() {
        let blocks = compile("@block.a: aa bb cc dd @overwrite(<0001>, ee) @end",&no_libs()).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"AAEECCDD");
    }
    #[test]
    fn body_macro_repeats_caller_body() {
        let src = "def !twice() {%%BODY%%} { %%BODY%% %%BODY%% }\n@block.a: !twice(){ 41 42 } @end";
        let blocks = compile(src,&no_libs()).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"41424142");
    }
    #[test]
    fn several_blocks_compile_independently() {
        let src = "@block.a: @adr.s aa [#s] @end @block.b: @adr.s bb [#s] @end";
        let blocks = compile(src,&no_libs()).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"AA0000");
        assert_eq!(blocks.get("b").expect("missing block"),"BB0000");
    }
}

mod imports {
    use super::*;

    #[test]
    fn library_definitions_are_usable() {
        let mut libs = HashMap::new();
        libs.insert("gadgets.rop".to_string(),"$nop { 90 }\n*push(v) { 68 [<%_v_%>] }".to_string());
        let blocks = compile("import gadgets.rop\n@block.a: $nop *push(dead) @end",&libs).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"9068ADDE");
    }
    #[test]
    fn program_definitions_shadow_library() {
        let mut libs = HashMap::new();
        libs.insert("l.rop".to_string(),"$r { aa }".to_string());
        let blocks = compile("import l.rop\ndef $r { bb }\n@block.a: $r @end",&libs).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"BB");
    }
    #[test]
    fn missing_library_does_not_abort() {
        let blocks = compile("import nope.rop\n@block.a: aa @end",&no_libs()).expect("compile error");
        assert_eq!(blocks.get("a").expect("missing block"),"AA");
    }
}

mod failures {
    use super::*;

    #[test]
    fn undefined_symbol() {
        let err = compile("@block.a: $nope @end",&no_libs()).expect_err("expected failure");
        assert!(err.to_string().contains("undefined function"));
    }
    #[test]
    fn circular_definition_diverges() {
        let err = compile("def $r { $r }\n@block.a: $r @end",&no_libs()).expect_err("expected failure");
        assert!(err.to_string().contains("did not settle"));
    }
    #[test]
    fn budget_is_enforced() {
        let mut compiler = Compiler::new();
        let mut settings = Settings::new();
        settings.parse_budget = 2;
        compiler.set_config(settings);
        let err = compiler.compile("@block.a: aa @end @block.b: bb @end",&no_libs()).expect_err("expected failure");
        assert!(err.to_string().contains("budget"));
    }
    #[test]
    fn unresolved_label() {
        let err = compile("@block.a: [#ghost] @end",&no_libs()).expect_err("expected failure");
        assert!(err.to_string().contains("never defined"));
    }
    #[test]
    fn duplicate_label() {
        let err = compile("@block.a: @adr.x aa @adr.x @end",&no_libs()).expect_err("expected failure");
        assert!(err.to_string().contains("already defined"));
    }
}

mod host_glue {
    use super::*;

    #[test]
    fn success_is_a_block_map() {
        let json = compile_to_json("@block.a: de ad @end",&no_libs());
        let root: serde_json::Value = serde_json::from_str(&json).expect("json error");
        assert_eq!(root["a"],serde_json::Value::String("DEAD".to_string()));
    }
    #[test]
    fn failure_is_a_single_error_key() {
        let json = compile_to_json("@block.a: $nope @end",&no_libs());
        let root: serde_json::Value = serde_json::from_str(&json).expect("json error");
        let obj = root.as_object().expect("expected object");
        assert_eq!(obj.len(),1);
        assert!(obj["error"].as_str().expect("expected string").starts_with("error: "));
    }
}
