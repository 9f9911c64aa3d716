mod html_extractor_tests;
mod text_parser_tests;
