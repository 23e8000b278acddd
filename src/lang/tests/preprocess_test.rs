use std::collections::HashMap;
use super::super::preprocessor::Preprocessor;
use super::super::Param;

fn no_libs() -> HashMap<String,String> {
    HashMap::new()
}

mod definitions {
    use super::*;

    #[test]
    fn constant() {
        let pre = Preprocessor::new();
        let parts = pre.parse_program("def $ret { c3 }",&no_libs()).expect("parse error");
        assert_eq!(parts.defs.constants.get("$ret").expect("missing"),&" c3 ".to_string());
    }
    #[test]
    fn simple_macro_with_default() {
        let pre = Preprocessor::new();
        let parts = pre.parse_program("def *push(v, w=11) { 68 %_v_% %_w_% }",&no_libs()).expect("parse error");
        let mac = parts.defs.simple.get("*push").expect("missing");
        assert_eq!(mac.params,vec![
            Param { name: "v".to_string(), default: None },
            Param { name: "w".to_string(), default: Some("11".to_string()) }
        ]);
        assert_eq!(mac.body," 68 %_v_% %_w_% ");
    }
    #[test]
    fn body_macro() {
        let pre = Preprocessor::new();
        let parts = pre.parse_program("def !twice() {%%BODY%%} { %%BODY%% %%BODY%% }",&no_libs()).expect("parse error");
        let mac = parts.defs.body_taking.get("!twice").expect("missing");
        assert_eq!(mac.params.len(),0);
        assert_eq!(mac.body," %%BODY%% %%BODY%% ");
    }
    #[test]
    fn nested_braces_are_preserved() {
        let pre = Preprocessor::new();
        let parts = pre.parse_program("def $x { aa { bb } cc }",&no_libs()).expect("parse error");
        assert_eq!(parts.defs.constants.get("$x").expect("missing"),&" aa {  bb  } cc ".to_string());
    }
    #[test]
    fn redefinition_is_last_write_wins() {
        let pre = Preprocessor::new();
        let parts = pre.parse_program("def $r { aa } def $r { bb }",&no_libs()).expect("parse error");
        assert_eq!(parts.defs.constants.get("$r").expect("missing"),&" bb ".to_string());
    }
}

mod blocks {
    use super::*;

    #[test]
    fn bodies_are_verbatim() {
        let pre = Preprocessor::new();
        let parts = pre.parse_program("@block.alpha: aa bb @blockend @block.beta: cc @end",&no_libs()).expect("parse error");
        assert_eq!(parts.blocks.get("alpha").expect("missing")," aa bb ");
        assert_eq!(parts.blocks.get("beta").expect("missing")," cc ");
    }
    #[test]
    fn comments_survive_in_bodies() {
        // comments inside a block are for later passes to ignore
        let pre = Preprocessor::new();
        let parts = pre.parse_program("@block.a: aa // patch me\n bb @end",&no_libs()).expect("parse error");
        assert_eq!(parts.blocks.get("a").expect("missing")," aa // patch me\n bb ");
    }
    #[test]
    fn missing_terminator_is_an_error() {
        let pre = Preprocessor::new();
        assert!(pre.parse_program("@block.a: aa bb",&no_libs()).is_err());
    }
    #[test]
    fn stray_text_is_an_error() {
        let pre = Preprocessor::new();
        assert!(pre.parse_program("bogus",&no_libs()).is_err());
    }
}

mod imports {
    use super::*;

    #[test]
    fn merges_definitions() {
        let mut libs = HashMap::new();
        libs.insert("gadgets.rop".to_string(),"$ret { c3 }\n*push(v) { 68 %_v_% }".to_string());
        let pre = Preprocessor::new();
        let parts = pre.parse_program("import gadgets.rop",&libs).expect("parse error");
        assert_eq!(parts.defs.constants.get("$ret").expect("missing"),&" c3 ".to_string());
        assert!(parts.defs.simple.contains_key("*push"));
    }
    #[test]
    fn program_shadows_imports() {
        let mut libs = HashMap::new();
        libs.insert("gadgets.rop".to_string(),"$ret { c3 }".to_string());
        let pre = Preprocessor::new();
        let parts = pre.parse_program("import gadgets.rop\ndef $ret { 90 }",&libs).expect("parse error");
        assert_eq!(parts.defs.constants.get("$ret").expect("missing"),&" 90 ".to_string());
    }
    #[test]
    fn missing_module_is_not_fatal() {
        let pre = Preprocessor::new();
        let parts = pre.parse_program("import nope.rop\n@block.a: aa @end",&no_libs()).expect("parse error");
        assert_eq!(parts.defs.len(),0);
        assert!(parts.blocks.contains_key("a"));
    }
    #[test]
    fn malformed_module_is_not_fatal() {
        // the def keyword belongs to the program grammar, not the library grammar
        let mut libs = HashMap::new();
        libs.insert("bad.rop".to_string(),"def $x { aa }".to_string());
        let pre = Preprocessor::new();
        let parts = pre.parse_program("import bad.rop\n@block.a: bb @end",&libs).expect("parse error");
        assert_eq!(parts.defs.len(),0);
    }
}

mod libraries {
    use super::*;

    #[test]
    fn bare_definitions_parse() {
        let pre = Preprocessor::new();
        let defs = pre.parse_library("$ret { c3 }\n*push(v) { 68 %_v_% }\n!twice() {%%BODY%%} { %%BODY%% %%BODY%% }").expect("parse error");
        assert_eq!(defs.len(),3);
    }
    #[test]
    fn blocks_are_rejected() {
        let pre = Preprocessor::new();
        assert!(pre.parse_library("@block.a: aa @end").is_err());
    }
    #[test]
    fn imports_are_rejected() {
        let pre = Preprocessor::new();
        assert!(pre.parse_library("import other.rop").is_err());
    }
}
