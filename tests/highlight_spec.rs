use npme::render::highlight::{highlight, span, Language};
use npme::render::TokenClass;
use speculate2::speculate;

fn keyword(text: &str) -> String {
    span(TokenClass::Keyword, text)
}

fn string(text: &str) -> String {
    span(TokenClass::String, text)
}

fn comment(text: &str) -> String {
    span(TokenClass::Comment, text)
}

fn number(text: &str) -> String {
    span(TokenClass::Number, text)
}

speculate! {
    describe "dispatch" {
        it "maps every alias to its family" {
            for tag in ["javascript", "js", "typescript", "ts", "jsx", "tsx"] {
                assert_eq!(Language::from_tag(tag), Some(Language::Script));
            }
            for tag in ["bash", "sh", "shell"] {
                assert_eq!(Language::from_tag(tag), Some(Language::Shell));
            }
            for tag in ["css", "scss", "sass"] {
                assert_eq!(Language::from_tag(tag), Some(Language::Stylesheet));
            }
            assert_eq!(Language::from_tag("xml"), Some(Language::Markup));
        }

        it "falls back to plain escaping" {
            assert_eq!(highlight("a < b && 'c'", "brainfuck"), "a &lt; b &amp;&amp; &#039;c&#039;");
        }

        it "ignores tag case" {
            assert_eq!(highlight("const a", "JS"), highlight("const a", "js"));
        }
    }

    describe "script family" {
        it "styles keywords, numbers and calls" {
            let out = highlight("return max(1, 2.5);", "js");
            assert!(out.contains(&keyword("return")));
            assert!(out.contains(&span(TokenClass::Function, "max")));
            assert!(out.contains(&number("1")));
            assert!(out.contains(&number("2.5")));
        }

        it "matches keywords on whole words only" {
            let out = highlight("constant = newValue;", "ts");
            assert!(!out.contains("<span"));
            assert_eq!(out, "constant = newValue;");
        }

        it "does not style keywords inside strings" {
            let out = highlight("let s = \"const if return\";", "js");
            assert!(out.contains(&string("&quot;const if return&quot;")));
            assert_eq!(out.matches("#569cd6").count(), 1);
        }

        it "treats // inside a string as part of the string" {
            let out = highlight("fetch('https://registry.npmjs.org')", "js");
            assert!(out.contains(&string("&#039;https://registry.npmjs.org&#039;")));
            assert!(!out.contains("#6a9955"));
        }

        it "styles line and block comments" {
            let out = highlight("x = 1; // one\n/* many\nlines */", "js");
            assert!(out.contains(&comment("// one")));
            assert!(out.contains(&comment("/* many\nlines */")));
        }

        it "does not style keywords inside comments" {
            let out = highlight("// return early", "js");
            assert_eq!(out, comment("// return early"));
        }

        it "handles template literals and escaped quotes" {
            let out = highlight(r#"const a = `x ${y}`, b = "say \"hi\"";"#, "js");
            assert!(out.contains(&string("`x ${y}`")));
            assert!(out.contains(&string(r#"&quot;say \&quot;hi\&quot;&quot;"#)));
        }
    }

    describe "python family" {
        it "styles keywords and hash comments" {
            let out = highlight("def f(x):\n    return x + 1  # add", "python");
            assert!(out.contains(&keyword("def")));
            assert!(out.contains(&keyword("return")));
            assert!(out.contains(&number("1")));
            assert!(out.contains(&comment("# add")));
        }

        it "keeps strings inside comments styled as strings" {
            let out = highlight("x = 1  # say \"hi\"", "py");
            assert!(out.contains(&string("&quot;hi&quot;")));
            assert!(out.contains("#6a9955"));
        }
    }

    describe "json family" {
        it "styles keys, values and literals" {
            let out = highlight("{\"name\": \"npme\", \"size\": 20, \"private\": true}", "json");
            assert!(out.contains(&span(TokenClass::Property, "&quot;name&quot;")));
            assert!(out.contains(&string("&quot;npme&quot;")));
            assert!(out.contains(&number("20")));
            assert!(out.contains(&keyword("true")));
        }

        it "does not treat words inside strings as literals" {
            let out = highlight("{\"note\": \"true story\"}", "json");
            assert!(!out.contains(&keyword("true")));
        }
    }

    describe "shell family" {
        it "styles prompt, commands and comments" {
            let out = highlight("$ npm install left-pad # pad strings", "bash");
            assert!(out.starts_with(&keyword("$ ")));
            assert!(out.contains(&keyword("npm")));
            assert!(out.contains(&comment("# pad strings")));
        }

        it "keeps hashes inside strings" {
            let out = highlight("echo \"# not a comment\"", "sh");
            assert!(out.contains(&keyword("echo")));
            assert!(out.contains(&string("&quot;# not a comment&quot;")));
            assert!(!out.contains("#6a9955"));
        }
    }

    describe "stylesheet family" {
        it "styles selectors, properties and values" {
            let out = highlight(".button {\n  color: red;\n}", "css");
            assert!(out.contains(&span(TokenClass::Selector, ".button")));
            assert!(out.contains(&span(TokenClass::Property, "color")));
            assert!(out.contains(&string("red")));
        }
    }

    describe "markup family" {
        it "styles tags, attributes and values" {
            let out = highlight("<a href=\"/x\">link</a>", "html");
            assert!(out.contains(&format!("&lt;{}", span(TokenClass::Tag, "a"))));
            assert!(out.contains(&format!("&lt;/{}", span(TokenClass::Tag, "a"))));
            assert!(out.contains(&span(TokenClass::Attribute, "href")));
            assert!(out.contains(&string("&quot;/x&quot;")));
        }

        it "styles comments" {
            let out = highlight("<!-- note -->", "xml");
            assert_eq!(out, comment("&lt;!-- note --&gt;"));
        }
    }
}
