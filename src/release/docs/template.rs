//! Cover page of the API PDF.
//!
//! Rendered with HTML escaping; `cover_title` is inserted raw because it
//! carries its own markup.

pub const COVER_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>{{pdf_title}}</title>
<meta name="author" content="{{author}}"/>
<meta name="subject" content="{{subject}}"/>
<meta name="keywords" content="{{keywords}}"/>
<style>
  .cover {page: cover; text-align: center; padding-top: 30%;}
  .cover h1 {font-size: 2.5em;}
  .toc {page-break-before: always;}
  .toc ul {list-style: none;}
{{#each depths}}  .toc li.depth{{this}} {margin-left: {{this}}em;}
{{/each}}</style>
</head>
<body>
<div class="cover">
  <h1>{{{cover_title}}}</h1>
  <p class="author">{{author}}</p>
</div>
<div class="toc">
  <h2>Contents</h2>
  <ul>
{{#each entries}}    <li class="depth{{depth}}"><a href="{{href}}">{{title}}</a>{{#if online}} <a class="online" href="{{online}}">[online]</a>{{/if}}</li>
{{/each}}  </ul>
</div>
</body>
</html>
"#;
