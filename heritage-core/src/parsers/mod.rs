pub mod heritage_xml;
